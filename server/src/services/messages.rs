/// Direct messages: immutable once created, replayed oldest first.
use crate::error::{AppError, Result};
use crate::models::{Message, MessageView, UserSummary};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct MessageViewRow {
    id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    sender_id: Uuid,
    sender_username: String,
    sender_email: String,
    sender_photo_id: Option<Uuid>,
    recipient_id: Uuid,
    recipient_username: String,
    recipient_email: String,
    recipient_photo_id: Option<Uuid>,
}

impl From<MessageViewRow> for MessageView {
    fn from(row: MessageViewRow) -> Self {
        MessageView {
            id: row.id,
            sender: UserSummary {
                id: row.sender_id,
                username: row.sender_username,
                email: row.sender_email,
                profile_photo_id: row.sender_photo_id,
            },
            recipient: UserSummary {
                id: row.recipient_id,
                username: row.recipient_username,
                email: row.recipient_email,
                profile_photo_id: row.recipient_photo_id,
            },
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn send(&self, sender_id: Uuid, recipient_id: Uuid, content: &str) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(AppError::Validation(
                "Message content cannot be empty".to_string(),
            ));
        }

        let recipient_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await?;
        if !recipient_exists {
            return Err(AppError::NotFound("Recipient not found".to_string()));
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, sender_id, recipient_id, content, created_at
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Both directions of a two-party conversation, oldest first.
    pub async fn conversation(&self, user_id: Uuid, other_id: Uuid) -> Result<Vec<MessageView>> {
        let rows = sqlx::query_as::<_, MessageViewRow>(
            r#"
            SELECT m.id, m.content, m.created_at,
                   s.id AS sender_id, s.username AS sender_username,
                   s.email AS sender_email, s.profile_photo_id AS sender_photo_id,
                   r.id AS recipient_id, r.username AS recipient_username,
                   r.email AS recipient_email, r.profile_photo_id AS recipient_photo_id
            FROM messages m
            JOIN users s ON s.id = m.sender_id
            JOIN users r ON r.id = m.recipient_id
            WHERE (m.sender_id = $1 AND m.recipient_id = $2)
               OR (m.sender_id = $2 AND m.recipient_id = $1)
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageView::from).collect())
    }
}
