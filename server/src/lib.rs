/// SocialSphere Server Library
///
/// REST backend for the SocialSphere social network: accounts, posts with
/// likes and comments, direct messages, friend relationships, and
/// notifications over PostgreSQL.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and their request/response types
/// - `models`: Entity structs and enumerations
/// - `services`: Business logic layer, one service per entity plus the
///   friend relationship engine
/// - `middleware`: Bearer-token authentication middleware
/// - `security`: Password hashing and JWT issuing/validation
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
