/// Business logic layer: one service per entity plus the friend
/// relationship engine. Services own a `PgPool` and their SQL; handlers
/// stay thin.
pub mod comments;
pub mod friends;
pub mod media;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod users;

pub use comments::CommentService;
pub use friends::FriendService;
pub use media::MediaService;
pub use messages::MessageService;
pub use notifications::NotificationService;
pub use posts::PostService;
pub use users::UserService;
