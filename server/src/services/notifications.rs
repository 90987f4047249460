/// Notification delivery: listing with resolved projections and the
/// read-flag flip. Creation happens inline from the mutation that causes
/// it (friend request/accept, like, comment) via `insert_notification`,
/// so a notification failure fails the enclosing request.
use crate::error::{AppError, Result};
use crate::models::{Notification, NotificationKind, NotificationView, UserSummary};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Insert a notification row. Takes any executor so callers can run it
/// inside their own transaction.
pub async fn insert_notification<'e, E>(
    executor: E,
    recipient_id: Uuid,
    sender_id: Uuid,
    kind: NotificationKind,
    post_id: Option<Uuid>,
    message: Option<String>,
) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO notifications (recipient_id, sender_id, kind, post_id, message)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(recipient_id)
    .bind(sender_id)
    .bind(kind.as_str())
    .bind(post_id)
    .bind(message)
    .execute(executor)
    .await?;

    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationViewRow {
    id: Uuid,
    kind: String,
    post_id: Option<Uuid>,
    post_title: Option<String>,
    message: Option<String>,
    read: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    sender_id: Uuid,
    sender_username: String,
    sender_email: String,
    sender_photo_id: Option<Uuid>,
}

impl From<NotificationViewRow> for NotificationView {
    fn from(row: NotificationViewRow) -> Self {
        NotificationView {
            id: row.id,
            sender: UserSummary {
                id: row.sender_id,
                username: row.sender_username,
                email: row.sender_email,
                profile_photo_id: row.sender_photo_id,
            },
            kind: row.kind,
            post_id: row.post_id,
            post_title: row.post_title,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All notifications for a recipient, newest first, with the sender
    /// and related post resolved for display.
    pub async fn list(&self, recipient_id: Uuid) -> Result<Vec<NotificationView>> {
        let rows = sqlx::query_as::<_, NotificationViewRow>(
            r#"
            SELECT n.id, n.kind, n.post_id, p.title AS post_title, n.message,
                   n.read, n.created_at,
                   u.id AS sender_id, u.username AS sender_username,
                   u.email AS sender_email, u.profile_photo_id AS sender_photo_id
            FROM notifications n
            JOIN users u ON u.id = n.sender_id
            LEFT JOIN posts p ON p.id = n.post_id
            WHERE n.recipient_id = $1
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(NotificationView::from).collect())
    }

    /// Flip the read flag. Idempotent: marking an already-read
    /// notification succeeds silently.
    pub async fn mark_read(&self, acting_user: Uuid, notification_id: Uuid) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, sender_id, kind, post_id, message, read, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if notification.recipient_id != acting_user {
            return Err(AppError::Unauthorized(
                "Not the recipient of this notification".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1
            RETURNING id, recipient_id, sender_id, kind, post_id, message, read, created_at
            "#,
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}
