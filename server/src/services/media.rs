/// Photo blob storage. Uploads arrive as inline base64 (optionally a
/// full data: URL); the decoded bytes live in the media table and the
/// user row keeps only the reference id.
use crate::error::{AppError, Result};
use crate::models::MediaObject;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sqlx::PgPool;
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Decode an inline photo payload into (content type, bytes).
///
/// Accepts either a bare base64 string or a `data:<mime>;base64,<data>`
/// URL as produced by browser FileReader APIs.
pub fn decode_photo_payload(payload: &str) -> Result<(String, Vec<u8>)> {
    let (content_type, b64) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(";base64,").ok_or_else(|| {
                AppError::Validation("Malformed data URL in photo payload".to_string())
            })?;
            let content_type = if header.is_empty() {
                DEFAULT_CONTENT_TYPE.to_string()
            } else {
                header.to_string()
            };
            (content_type, data)
        }
        None => (DEFAULT_CONTENT_TYPE.to_string(), payload),
    };

    let bytes = BASE64
        .decode(b64.trim())
        .map_err(|e| AppError::Validation(format!("Invalid base64 photo payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Empty photo payload".to_string()));
    }

    Ok((content_type, bytes))
}

#[derive(Clone)]
pub struct MediaService {
    pool: PgPool,
}

impl MediaService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn store(&self, owner_id: Uuid, content_type: &str, data: &[u8]) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO media (owner_id, content_type, data)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(content_type)
        .bind(data)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get(&self, media_id: Uuid) -> Result<MediaObject> {
        let media = sqlx::query_as::<_, MediaObject>(
            r#"
            SELECT id, owner_id, content_type, data, created_at
            FROM media
            WHERE id = $1
            "#,
        )
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bare_base64() {
        let (content_type, bytes) = decode_photo_payload("aGVsbG8=").unwrap();
        assert_eq!(content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_data_url() {
        let (content_type, bytes) = decode_photo_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_photo_payload("not base64 at all!!!").is_err());
        assert!(decode_photo_payload("data:image/png;base64,???").is_err());
        assert!(decode_photo_payload("data:image/png,missing-marker").is_err());
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(decode_photo_payload("").is_err());
        assert!(decode_photo_payload("data:image/png;base64,").is_err());
    }
}
