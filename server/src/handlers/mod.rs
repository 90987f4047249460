/// HTTP request handlers and their request/response types
pub mod auth;
pub mod comments;
pub mod media;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod users;
