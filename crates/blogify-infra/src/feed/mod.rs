//! Change feed implementations.

mod memory;
mod notifying;

pub use memory::InMemoryChangeFeed;
pub use notifying::{ChangeNotifier, ChangeTracked};

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisChangeFeed, RedisConfig};
