/// Comment service: ownership-gated CRUD plus the comment notification
/// side effect.
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentView, NotificationKind, UserSummary};
use crate::services::notifications::insert_notification;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct CommentViewRow {
    id: Uuid,
    post_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    author_email: String,
    author_photo_id: Option<Uuid>,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        CommentView {
            id: row.id,
            post_id: row.post_id,
            author: UserSummary {
                id: row.author_id,
                username: row.author_username,
                email: row.author_email,
                profile_photo_id: row.author_photo_id,
            },
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a comment. Commenting on someone else's post notifies its
    /// author; both writes share one transaction.
    pub async fn add(&self, actor: Uuid, post_id: Uuid, content: &str) -> Result<Comment> {
        let author_id: Uuid = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(actor)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        if author_id != actor {
            insert_notification(
                &mut *tx,
                author_id,
                actor,
                NotificationKind::Comment,
                Some(post_id),
                None,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(comment)
    }

    /// Comments on a post, newest first, with authors resolved.
    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT c.id, c.post_id, c.content, c.created_at, c.updated_at,
                   u.id AS author_id, u.username AS author_username,
                   u.email AS author_email, u.profile_photo_id AS author_photo_id
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentView::from).collect())
    }

    async fn fetch_owned(&self, actor: Uuid, comment_id: Uuid) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, content, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if comment.author_id != actor {
            return Err(AppError::Unauthorized(
                "Not the author of this comment".to_string(),
            ));
        }

        Ok(comment)
    }

    pub async fn update(&self, actor: Uuid, comment_id: Uuid, content: &str) -> Result<Comment> {
        self.fetch_owned(actor, comment_id).await?;

        let updated = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, post_id, author_id, content, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, actor: Uuid, comment_id: Uuid) -> Result<()> {
        self.fetch_owned(actor, comment_id).await?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
