//! In-memory store - used as fallback when PostgreSQL is unavailable.

mod store;

pub use store::{InMemoryBlogRepository, InMemoryProfileRepository, InMemoryStore};
