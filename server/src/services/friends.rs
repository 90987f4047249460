/// Friend relationship engine.
///
/// Maintains the symmetric friend edge and the directed pending-request
/// queue, and emits notification side effects synchronously with each
/// transition. The edge is stored once per unordered pair (canonical
/// orientation `user_a < user_b`), so add/remove are single-row writes
/// and symmetry holds by construction; every multi-row transition runs
/// inside one transaction.
use crate::error::{AppError, Result};
use crate::models::{NotificationKind, UserSummary};
use crate::services::notifications::insert_notification;
use sqlx::PgPool;
use uuid::Uuid;

/// Canonical orientation for the friendship edge.
fn edge(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone)]
pub struct FriendService {
    pool: PgPool,
}

impl FriendService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_summary(&self, user_id: Uuid) -> Result<Option<UserSummary>> {
        let user = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, email, profile_photo_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Whether the symmetric friend edge exists.
    pub async fn are_friends(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let (user_a, user_b) = edge(a, b);
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM friendships
                WHERE user_a = $1 AND user_b = $2
            )
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn has_pending(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM friend_requests
                WHERE sender_id = $1 AND receiver_id = $2
            )
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Queue a friend request and notify the receiver.
    ///
    /// The pending state is held only on the receiver side; the sender
    /// keeps no "sent requests" record.
    pub async fn send_request(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<()> {
        if sender_id == receiver_id {
            return Err(AppError::InvalidOperation(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        let sender = self
            .find_summary(sender_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if self.find_summary(receiver_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if self.are_friends(sender_id, receiver_id).await? {
            return Err(AppError::Conflict("Already friends".to_string()));
        }
        if self.has_pending(sender_id, receiver_id).await? {
            return Err(AppError::Conflict("Friend request already sent".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO friend_requests (sender_id, receiver_id)
            VALUES ($1, $2)
            ON CONFLICT (sender_id, receiver_id) DO NOTHING
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&mut *tx)
        .await?;

        insert_notification(
            &mut *tx,
            receiver_id,
            sender_id,
            NotificationKind::FriendRequest,
            None,
            Some(format!("{} sent you a friend request", sender.username)),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Accept a pending request: establish the edge, clear the pending
    /// entry, notify both parties, and drop the now-stale friend_request
    /// notification so no dead actionable entry lingers in the tray.
    pub async fn accept_request(&self, receiver_id: Uuid, sender_id: Uuid) -> Result<()> {
        let sender = self
            .find_summary(sender_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let receiver = self
            .find_summary(receiver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !self.has_pending(sender_id, receiver_id).await? {
            return Err(AppError::InvalidOperation(
                "No friend request from this user".to_string(),
            ));
        }

        let (user_a, user_b) = edge(sender_id, receiver_id);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO friendships (user_a, user_b)
            VALUES ($1, $2)
            ON CONFLICT (user_a, user_b) DO NOTHING
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM friend_requests
            WHERE sender_id = $1 AND receiver_id = $2
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&mut *tx)
        .await?;

        insert_notification(
            &mut *tx,
            sender_id,
            receiver_id,
            NotificationKind::FriendAccept,
            None,
            Some(format!(
                "{} accepted your friend request. You are now friends!",
                receiver.username
            )),
        )
        .await?;

        insert_notification(
            &mut *tx,
            receiver_id,
            sender_id,
            NotificationKind::FriendAccept,
            None,
            Some(format!("You are now friends with {}", sender.username)),
        )
        .await?;

        sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE recipient_id = $1 AND sender_id = $2 AND kind = 'friend_request'
            "#,
        )
        .bind(receiver_id)
        .bind(sender_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Reject a pending request. No notification is emitted, but the
    /// stale friend_request notification is cleared just as accept does.
    pub async fn reject_request(&self, receiver_id: Uuid, sender_id: Uuid) -> Result<()> {
        if self.find_summary(sender_id).await?.is_none()
            || self.find_summary(receiver_id).await?.is_none()
        {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if !self.has_pending(sender_id, receiver_id).await? {
            return Err(AppError::InvalidOperation(
                "No friend request from this user".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM friend_requests
            WHERE sender_id = $1 AND receiver_id = $2
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE recipient_id = $1 AND sender_id = $2 AND kind = 'friend_request'
            "#,
        )
        .bind(receiver_id)
        .bind(sender_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove an existing friendship. Deleting the single edge row is
    /// atomic; a zero-row delete means the pair was never friends.
    pub async fn remove_friend(&self, user_id: Uuid, friend_id: Uuid) -> Result<()> {
        if user_id == friend_id {
            return Err(AppError::InvalidOperation(
                "Cannot remove yourself".to_string(),
            ));
        }

        if self.find_summary(user_id).await?.is_none()
            || self.find_summary(friend_id).await?.is_none()
        {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let (user_a, user_b) = edge(user_id, friend_id);
        let affected = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE user_a = $1 AND user_b = $2
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::InvalidOperation(
                "Not friends with this user".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve a user's friends to display summaries.
    pub async fn friends_of(&self, user_id: Uuid) -> Result<Vec<UserSummary>> {
        let friends = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.email, u.profile_photo_id
            FROM friendships f
            JOIN users u
              ON u.id = CASE WHEN f.user_a = $1 THEN f.user_b ELSE f.user_a END
            WHERE f.user_a = $1 OR f.user_b = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    /// Inbound pending requests for a receiver, oldest first.
    pub async fn pending_requests(&self, receiver_id: Uuid) -> Result<Vec<UserSummary>> {
        let senders = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.email, u.profile_photo_id
            FROM friend_requests fr
            JOIN users u ON u.id = fr.sender_id
            WHERE fr.receiver_id = $1
            ORDER BY fr.created_at ASC
            "#,
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(senders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_orientation_is_canonical() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(edge(a, b), edge(b, a));
        let (lo, hi) = edge(a, b);
        assert!(lo < hi);
    }
}
