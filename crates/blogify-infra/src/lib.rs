//! # Blogify Infrastructure
//!
//! Concrete implementations of the ports defined in `blogify-core`.
//! This crate contains the stores, change feeds and session validation.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL store via SeaORM
//! - `auth` - JWT session validation
//! - `redis` - Redis change feed for multi-instance deployments

pub mod database;
pub mod feed;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use feed::{ChangeNotifier, InMemoryChangeFeed};
pub use memory::{InMemoryBlogRepository, InMemoryProfileRepository, InMemoryStore};

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresBlogRepository, PostgresProfileRepository};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use feed::{RedisChangeFeed, RedisConfig};
