//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod feed;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, FeedError, Subscription, Table};
pub use repository::{
    BaseRepository, BlogFilter, BlogOrder, BlogQuery, BlogRepository, Direction,
    ProfileRepository, VerifyOutcome,
};
