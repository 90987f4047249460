/// User accounts: registration, login, profile management, search.
use crate::error::{AppError, Result};
use crate::models::{User, UserSummary};
use crate::security::password;
use sqlx::PgPool;
use uuid::Uuid;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

const USER_COLUMNS: &str = "id, username, email, password_hash, bio, \
                            profile_photo_id, banner_photo_id, created_at, updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account. Duplicate email answers `Conflict`.
    pub async fn register(&self, username: &str, email: &str, plain_password: &str) -> Result<UserSummary> {
        let password_hash = password::hash_password(plain_password)?;

        let result = sqlx::query_as::<_, UserSummary>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, profile_photo_id
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(summary) => Ok(summary),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("User already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials. Both unknown email and a bad password answer
    /// the same `Unauthorized` so the response does not leak which part
    /// was wrong.
    pub async fn login(&self, email: &str, plain_password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let user = match user {
            Some(user) => user,
            None => {
                return Err(AppError::Unauthorized(
                    "Invalid email or password".to_string(),
                ))
            }
        };

        if !password::verify_password(plain_password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Partial update of the acting user's own profile.
    pub async fn update_profile(
        &self,
        actor: Uuid,
        username: Option<&str>,
        email: Option<&str>,
        bio: Option<&str>,
    ) -> Result<User> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                email = COALESCE($2, email),
                bio = COALESCE($3, bio),
                updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .bind(bio)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AppError::NotFound("User not found".to_string())),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Email already in use".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Username substring search, case-insensitive, excluding the actor.
    pub async fn search(&self, actor: Uuid, query: &str) -> Result<Vec<UserSummary>> {
        let pattern = crate::services::posts::like_pattern(query);

        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, email, profile_photo_id
            FROM users
            WHERE username ILIKE $1 AND id <> $2
            ORDER BY username
            "#,
        )
        .bind(pattern)
        .bind(actor)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Point the user row at a newly stored photo blob.
    pub async fn set_photo(&self, actor: Uuid, media_id: Uuid, banner: bool) -> Result<()> {
        let column = if banner {
            "banner_photo_id"
        } else {
            "profile_photo_id"
        };

        let affected = sqlx::query(&format!(
            "UPDATE users SET {} = $1, updated_at = NOW() WHERE id = $2",
            column
        ))
        .bind(media_id)
        .bind(actor)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}
