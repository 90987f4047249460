/// JWT token generation and validation using HS256
/// Access tokens expire after one hour by default.
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
}

/// Signing and validation keys, held in application state.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, token_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    /// Generate a signed access token for a user
    pub fn generate_token(&self, user_id: Uuid, email: &str, username: &str) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.token_ttl_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            email: email.to_string(),
            username: username.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow!("Failed to generate access token: {}", e))
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| anyhow!("Token validation failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let keys = JwtKeys::new("test-secret", 3600);
        let user_id = Uuid::new_v4();

        let token = keys
            .generate_token(user_id, "a@example.com", "alice")
            .expect("should generate token");
        let data = keys.validate_token(&token).expect("should validate token");

        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.email, "a@example.com");
        assert_eq!(data.claims.username, "alice");
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = JwtKeys::new("test-secret", -120);
        let token = keys
            .generate_token(Uuid::new_v4(), "a@example.com", "alice")
            .expect("should generate token");

        assert!(keys.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = JwtKeys::new("test-secret", 3600);
        let other = JwtKeys::new("other-secret", 3600);

        let token = keys
            .generate_token(Uuid::new_v4(), "a@example.com", "alice")
            .expect("should generate token");

        assert!(other.validate_token(&token).is_err());
    }
}
