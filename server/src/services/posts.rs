/// Post service: CRUD, the typed listing filter, and the like toggle.
use crate::error::{AppError, Result};
use crate::models::{NotificationKind, PostFilter, PostSort, PostView, UserSummary};
use crate::services::notifications::insert_notification;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const MAX_PAGE_SIZE: i64 = 100;

/// One page of a post listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Fields a post author may change. The author itself is immutable.
#[derive(Debug, Default, Clone)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct PostViewRow {
    id: Uuid,
    title: String,
    content: String,
    tags: Vec<String>,
    category: Option<String>,
    likes: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    author_email: String,
    author_photo_id: Option<Uuid>,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        PostView {
            id: row.id,
            author: UserSummary {
                id: row.author_id,
                username: row.author_username,
                email: row.author_email,
                profile_photo_id: row.author_photo_id,
            },
            title: row.title,
            content: row.content,
            tags: row.tags,
            category: row.category,
            likes: row.likes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const POST_VIEW_SELECT: &str = r#"
SELECT p.id, p.title, p.content, p.tags, p.category,
       COALESCE(l.like_ids, ARRAY[]::uuid[]) AS likes,
       p.created_at, p.updated_at,
       u.id AS author_id, u.username AS author_username,
       u.email AS author_email, u.profile_photo_id AS author_photo_id
FROM posts p
JOIN users u ON u.id = p.author_id
LEFT JOIN LATERAL (
    SELECT array_agg(pl.user_id ORDER BY pl.created_at) AS like_ids
    FROM post_likes pl
    WHERE pl.post_id = p.id
) l ON TRUE
"#;

/// Turn a raw search term into an escaped ILIKE pattern. `%`, `_` and
/// the escape character itself are neutralized so the term only ever
/// matches as a literal substring.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Append WHERE conditions for the typed filter. Used identically by the
/// listing query and the count query; only `p.*` columns are referenced.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    qb.push(" WHERE TRUE");

    if let Some(author) = filter.author {
        qb.push(" AND p.author_id = ").push_bind(author);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(tag) = &filter.tag {
        qb.push(" AND ").push_bind(tag.clone()).push(" = ANY(p.tags)");
    }
    if let Some(category) = &filter.category {
        qb.push(" AND p.category = ").push_bind(category.clone());
    }
}

#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        title: &str,
        content: &str,
        tags: Vec<String>,
        category: Option<String>,
    ) -> Result<PostView> {
        let post_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, title, content, tags, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(tags)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        self.get(post_id).await
    }

    pub async fn get(&self, post_id: Uuid) -> Result<PostView> {
        let row = sqlx::query_as::<_, PostViewRow>(&format!(
            "{} WHERE p.id = $1",
            POST_VIEW_SELECT
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        Ok(row.into())
    }

    /// List posts under a typed filter with pagination. Total page count
    /// is derived from the total matching row count.
    pub async fn list(&self, filter: &PostFilter) -> Result<PostPage> {
        let page = filter.page.max(1);
        let limit = filter.limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM posts p");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(POST_VIEW_SELECT);
        push_filters(&mut qb, filter);
        qb.push(match filter.sort {
            PostSort::Newest => " ORDER BY p.created_at DESC",
            PostSort::Oldest => " ORDER BY p.created_at ASC",
            PostSort::Popular => {
                " ORDER BY COALESCE(array_length(l.like_ids, 1), 0) DESC, p.created_at DESC"
            }
        });
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows: Vec<PostViewRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(PostPage {
            posts: rows.into_iter().map(PostView::from).collect(),
            total_pages: (total + limit - 1) / limit,
            current_page: page,
        })
    }

    pub async fn update(&self, actor: Uuid, post_id: Uuid, patch: PostPatch) -> Result<PostView> {
        let author_id: Uuid = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if author_id != actor {
            return Err(AppError::Unauthorized(
                "Not the author of this post".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE posts
            SET title = COALESCE($1, title),
                content = COALESCE($2, content),
                tags = COALESCE($3, tags),
                category = COALESCE($4, category),
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.tags)
        .bind(patch.category)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        self.get(post_id).await
    }

    pub async fn delete(&self, actor: Uuid, post_id: Uuid) -> Result<()> {
        let author_id: Uuid = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if author_id != actor {
            return Err(AppError::Unauthorized(
                "Not the author of this post".to_string(),
            ));
        }

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Toggle the actor's membership in the post's like set. When the
    /// result is "now liked" and the actor is not the author, a `like`
    /// notification is created carrying the liker's current username and
    /// the post title. Runs in one transaction.
    pub async fn toggle_like(&self, actor: Uuid, post_id: Uuid) -> Result<PostView> {
        let post: Option<(Uuid, String)> =
            sqlx::query_as("SELECT author_id, title FROM posts WHERE id = $1")
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await?;
        let (author_id, title) =
            post.ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM post_likes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(actor)
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                r#"
                INSERT INTO post_likes (user_id, post_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, post_id) DO NOTHING
                "#,
            )
            .bind(actor)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

            if author_id != actor {
                // Fresh read of the liker's username at toggle time.
                let username: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
                    .bind(actor)
                    .fetch_one(&mut *tx)
                    .await?;

                insert_notification(
                    &mut *tx,
                    author_id,
                    actor,
                    NotificationKind::Like,
                    Some(post_id),
                    Some(format!("{} liked your post \"{}\"", username, title)),
                )
                .await?;
            }
        }

        tx.commit().await?;
        self.get(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("hello"), "%hello%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_filter_sql_assembly() {
        let filter = PostFilter {
            search: Some("hello".to_string()),
            tag: Some("rust".to_string()),
            category: Some("tech".to_string()),
            author: Some(Uuid::new_v4()),
            sort: PostSort::Oldest,
            page: 1,
            limit: 10,
        };

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
        push_filters(&mut qb, &filter);
        let sql = qb.sql();

        assert!(sql.contains("p.author_id ="));
        assert!(sql.contains("p.title ILIKE"));
        assert!(sql.contains("p.content ILIKE"));
        assert!(sql.contains("= ANY(p.tags)"));
        assert!(sql.contains("p.category ="));
    }

    #[test]
    fn test_filter_sql_empty() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
        push_filters(&mut qb, &PostFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM posts p WHERE TRUE");
    }
}
