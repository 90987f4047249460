// Integration tests for the friend relationship engine and post listing.
//
// These tests run against a real PostgreSQL instance:
//   export DATABASE_URL=postgres://localhost/socialsphere_test
//   cargo test -p socialsphere-server -- --ignored

use socialsphere_server::error::AppError;
use socialsphere_server::models::{PostFilter, PostSort};
use socialsphere_server::services::{
    CommentService, FriendService, NotificationService, PostService, UserService,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

async fn create_user(pool: &PgPool, name: &str) -> Uuid {
    let service = UserService::new(pool.clone());
    let email = format!("{}-{}@example.com", name, Uuid::new_v4());
    let summary = service
        .register(name, &email, "correct horse battery")
        .await
        .expect("failed to create test user");
    summary.id
}

#[tokio::test]
#[ignore] // Requires database setup
async fn accept_establishes_symmetric_friendship_and_clears_queue() {
    let pool = test_pool().await;
    let friends = FriendService::new(pool.clone());

    let u1 = create_user(&pool, "alice").await;
    let u2 = create_user(&pool, "bob").await;

    friends.send_request(u1, u2).await.expect("send should succeed");

    let pending: Vec<Uuid> = friends
        .pending_requests(u2)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(pending, vec![u1]);

    friends.accept_request(u2, u1).await.expect("accept should succeed");

    // Symmetry both ways
    assert!(friends.are_friends(u1, u2).await.unwrap());
    assert!(friends.are_friends(u2, u1).await.unwrap());
    assert!(friends
        .friends_of(u1)
        .await
        .unwrap()
        .iter()
        .any(|f| f.id == u2));
    assert!(friends
        .friends_of(u2)
        .await
        .unwrap()
        .iter()
        .any(|f| f.id == u1));

    // Pending entry gone from both directions
    assert!(friends.pending_requests(u2).await.unwrap().is_empty());
    assert!(friends.pending_requests(u1).await.unwrap().is_empty());

    // u1 received a friend_accept notification and the stale
    // friend_request entry for u2 was cleaned up
    let notifications = NotificationService::new(pool.clone());
    let for_sender = notifications.list(u1).await.unwrap();
    assert!(for_sender.iter().any(|n| n.kind == "friend_accept"));

    let for_receiver = notifications.list(u2).await.unwrap();
    assert!(!for_receiver
        .iter()
        .any(|n| n.kind == "friend_request" && n.sender.id == u1));
    assert!(for_receiver.iter().any(|n| n.kind == "friend_accept"));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn duplicate_friend_request_conflicts() {
    let pool = test_pool().await;
    let friends = FriendService::new(pool.clone());

    let a = create_user(&pool, "carol").await;
    let b = create_user(&pool, "dave").await;

    friends.send_request(a, b).await.expect("first send should succeed");
    let second = friends.send_request(a, b).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn self_request_is_invalid() {
    let pool = test_pool().await;
    let friends = FriendService::new(pool.clone());

    let a = create_user(&pool, "erin").await;
    let result = friends.send_request(a, a).await;
    assert!(matches!(result, Err(AppError::InvalidOperation(_))));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn reject_clears_only_the_pending_entry() {
    let pool = test_pool().await;
    let friends = FriendService::new(pool.clone());

    let a = create_user(&pool, "frank").await;
    let b = create_user(&pool, "grace").await;

    friends.send_request(a, b).await.unwrap();
    friends.reject_request(b, a).await.expect("reject should succeed");

    assert!(!friends.are_friends(a, b).await.unwrap());
    assert!(friends.pending_requests(b).await.unwrap().is_empty());

    // Rejecting again fails: the relationship is back to none
    let again = friends.reject_request(b, a).await;
    assert!(matches!(again, Err(AppError::InvalidOperation(_))));

    // The stale friend_request notification is cleared as well
    let notifications = NotificationService::new(pool.clone());
    let for_b = notifications.list(b).await.unwrap();
    assert!(!for_b
        .iter()
        .any(|n| n.kind == "friend_request" && n.sender.id == a));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn remove_friend_requires_existing_edge() {
    let pool = test_pool().await;
    let friends = FriendService::new(pool.clone());

    let a = create_user(&pool, "heidi").await;
    let b = create_user(&pool, "ivan").await;

    let not_friends = friends.remove_friend(a, b).await;
    assert!(matches!(not_friends, Err(AppError::InvalidOperation(_))));

    friends.send_request(a, b).await.unwrap();
    friends.accept_request(b, a).await.unwrap();
    friends.remove_friend(a, b).await.expect("remove should succeed");

    assert!(!friends.are_friends(a, b).await.unwrap());
    assert!(!friends.are_friends(b, a).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn like_toggle_is_its_own_inverse() {
    let pool = test_pool().await;
    let posts = PostService::new(pool.clone());

    let author = create_user(&pool, "judy").await;
    let liker = create_user(&pool, "mallory").await;

    let post = posts
        .create(author, "A title", "Some content", vec![], None)
        .await
        .unwrap();
    assert!(post.likes.is_empty());

    let liked = posts.toggle_like(liker, post.id).await.unwrap();
    assert_eq!(liked.likes, vec![liker]);

    // Liking someone else's post notifies the author with a rendered message
    let notifications = NotificationService::new(pool.clone());
    let for_author = notifications.list(author).await.unwrap();
    let like_note = for_author
        .iter()
        .find(|n| n.kind == "like" && n.post_id == Some(post.id))
        .expect("author should have a like notification");
    assert_eq!(like_note.post_title.as_deref(), Some("A title"));
    assert!(like_note
        .message
        .as_deref()
        .unwrap()
        .contains("liked your post"));

    let unliked = posts.toggle_like(liker, post.id).await.unwrap();
    assert!(unliked.likes.is_empty());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn non_author_cannot_delete_post() {
    let pool = test_pool().await;
    let posts = PostService::new(pool.clone());

    let author = create_user(&pool, "oscar").await;
    let other = create_user(&pool, "peggy").await;

    let post = posts
        .create(author, "Keep me", "Body", vec![], None)
        .await
        .unwrap();

    let denied = posts.delete(other, post.id).await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));

    // Post survives
    let still_there = posts.get(post.id).await.unwrap();
    assert_eq!(still_there.id, post.id);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn comment_ownership_and_notification() {
    let pool = test_pool().await;
    let posts = PostService::new(pool.clone());
    let comments = CommentService::new(pool.clone());

    let author = create_user(&pool, "trent").await;
    let commenter = create_user(&pool, "victor").await;

    let post = posts
        .create(author, "Open thread", "Body", vec![], None)
        .await
        .unwrap();

    // Commenting on someone else's post notifies its author
    let comment = comments
        .add(commenter, post.id, "first!")
        .await
        .expect("comment should succeed");

    let notifications = NotificationService::new(pool.clone());
    let for_author = notifications.list(author).await.unwrap();
    let comment_notes: Vec<_> = for_author
        .iter()
        .filter(|n| n.kind == "comment" && n.post_id == Some(post.id))
        .collect();
    assert_eq!(comment_notes.len(), 1);
    assert_eq!(comment_notes[0].sender.id, commenter);

    // Commenting on your own post creates no notification
    comments
        .add(author, post.id, "replying to myself")
        .await
        .unwrap();
    let for_author = notifications.list(author).await.unwrap();
    assert_eq!(
        for_author
            .iter()
            .filter(|n| n.kind == "comment" && n.post_id == Some(post.id))
            .count(),
        1
    );

    // Only the comment's author may update or delete it
    let denied_update = comments.update(author, comment.id, "hijacked").await;
    assert!(matches!(denied_update, Err(AppError::Unauthorized(_))));

    let denied_delete = comments.delete(author, comment.id).await;
    assert!(matches!(denied_delete, Err(AppError::Unauthorized(_))));

    let updated = comments
        .update(commenter, comment.id, "edited")
        .await
        .expect("author update should succeed");
    assert_eq!(updated.content, "edited");

    comments
        .delete(commenter, comment.id)
        .await
        .expect("author delete should succeed");

    // Gone afterwards: further edits answer NotFound
    let missing = comments.update(commenter, comment.id, "too late").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn list_posts_filters_sorts_and_paginates() {
    let pool = test_pool().await;
    let posts = PostService::new(pool.clone());

    let author = create_user(&pool, "quentin").await;
    let marker = Uuid::new_v4().simple().to_string();

    posts
        .create(author, &format!("Hello {} one", marker), "x", vec![], None)
        .await
        .unwrap();
    posts
        .create(author, "unrelated", &format!("body says HELLO {}", marker), vec![], None)
        .await
        .unwrap();
    posts
        .create(author, "no match here", &marker.to_string(), vec![], None)
        .await
        .unwrap();

    let filter = PostFilter {
        search: Some(format!("hello {}", marker)),
        sort: PostSort::Oldest,
        page: 1,
        limit: 10,
        ..Default::default()
    };
    let page = posts.list(&filter).await.unwrap();

    // Case-insensitive substring match over title or content
    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.current_page, 1);

    // Ascending by creation time
    assert!(page.posts[0].created_at <= page.posts[1].created_at);

    // ceil(count/limit) pagination
    let paged = posts
        .list(&PostFilter {
            search: Some(marker.clone()),
            sort: PostSort::Oldest,
            page: 1,
            limit: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paged.total_pages, 2);
    assert_eq!(paged.posts.len(), 2);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn mark_notification_read_is_owner_gated_and_idempotent() {
    let pool = test_pool().await;
    let friends = FriendService::new(pool.clone());
    let notifications = NotificationService::new(pool.clone());

    let a = create_user(&pool, "rupert").await;
    let b = create_user(&pool, "sybil").await;

    friends.send_request(a, b).await.unwrap();

    let inbox = notifications.list(b).await.unwrap();
    let note = inbox.first().expect("receiver should have a notification");
    assert!(!note.read);

    // Not the recipient
    let denied = notifications.mark_read(a, note.id).await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));

    let read = notifications.mark_read(b, note.id).await.unwrap();
    assert!(read.read);

    // Idempotent
    let again = notifications.mark_read(b, note.id).await.unwrap();
    assert!(again.read);
}
