//! Application state - shared across all handlers.

use std::sync::Arc;

use blogify_core::ports::{BlogRepository, ChangeFeed, ProfileRepository};
use blogify_core::services::{BlogCatalog, VerificationWorkflow};
use blogify_infra::{ChangeNotifier, InMemoryChangeFeed, InMemoryStore};

#[cfg(feature = "postgres")]
use blogify_infra::{DatabaseConnections, PostgresBlogRepository, PostgresProfileRepository};
#[cfg(feature = "redis")]
use blogify_infra::{RedisChangeFeed, RedisConfig};

use crate::config::{AppConfig, ViewSettings};

/// Which implementations the state was built from, as reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backends {
    pub store: &'static str,
    pub feed: &'static str,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blogs: Arc<dyn BlogRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub feed: Arc<dyn ChangeFeed>,
    pub views: ViewSettings,
    pub backends: Backends,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// PostgreSQL and Redis are used when configured and reachable; otherwise
    /// the in-memory store and feed take their place.
    pub async fn new(config: &AppConfig) -> Self {
        let (feed, feed_backend) = Self::init_feed(config).await;
        let (blogs, profiles, store_backend) = Self::init_store(config, feed.clone()).await;

        tracing::info!(
            store = store_backend,
            feed = feed_backend,
            "Application state initialized"
        );

        Self {
            blogs,
            profiles,
            feed,
            views: config.views.clone(),
            backends: Backends {
                store: store_backend,
                feed: feed_backend,
            },
        }
    }

    /// In-memory state plus a handle on its store for seeding.
    #[cfg(test)]
    pub fn in_memory(views: ViewSettings) -> (Self, InMemoryStore) {
        let store = InMemoryStore::new();
        let feed: Arc<dyn ChangeFeed> = Arc::new(InMemoryChangeFeed::default());
        let state = Self {
            blogs: Arc::new(ChangeNotifier::new(store.blogs(), feed.clone())),
            profiles: Arc::new(ChangeNotifier::new(store.profiles(), feed.clone())),
            feed,
            views,
            backends: Backends {
                store: "memory",
                feed: "memory",
            },
        };
        (state, store)
    }

    pub fn catalog(&self) -> BlogCatalog {
        BlogCatalog::new(self.blogs.clone(), self.profiles.clone())
    }

    pub fn workflow(&self) -> VerificationWorkflow {
        VerificationWorkflow::new(self.blogs.clone()).with_history_limit(self.views.history_limit)
    }

    #[cfg(feature = "redis")]
    async fn init_feed(config: &AppConfig) -> (Arc<dyn ChangeFeed>, &'static str) {
        if let Some(settings) = &config.redis {
            let redis_config = RedisConfig {
                url: settings.url.clone(),
                connect_timeout: settings.connect_timeout,
            };
            match RedisChangeFeed::new(redis_config).await {
                Ok(feed) => return (Arc::new(feed), "redis"),
                Err(e) => {
                    tracing::warn!(error = %e, "Redis unavailable. Using in-memory change feed.");
                }
            }
        } else {
            tracing::warn!("REDIS_URL not set. Changes are only seen by this instance.");
        }
        (Arc::new(InMemoryChangeFeed::default()), "memory")
    }

    #[cfg(not(feature = "redis"))]
    async fn init_feed(_config: &AppConfig) -> (Arc<dyn ChangeFeed>, &'static str) {
        tracing::info!("Running without redis feature - using in-memory change feed");
        (Arc::new(InMemoryChangeFeed::default()), "memory")
    }

    #[cfg(feature = "postgres")]
    async fn init_store(
        config: &AppConfig,
        feed: Arc<dyn ChangeFeed>,
    ) -> (Arc<dyn BlogRepository>, Arc<dyn ProfileRepository>, &'static str) {
        if let Some(db_config) = &config.database {
            match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let blogs = PostgresBlogRepository::new(connections.main.clone());
                    let profiles = PostgresProfileRepository::new(connections.main);
                    return (
                        Arc::new(ChangeNotifier::new(blogs, feed.clone())),
                        Arc::new(ChangeNotifier::new(profiles, feed)),
                        "postgres",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }
        Self::memory_store(feed)
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_store(
        _config: &AppConfig,
        feed: Arc<dyn ChangeFeed>,
    ) -> (Arc<dyn BlogRepository>, Arc<dyn ProfileRepository>, &'static str) {
        tracing::info!("Running without postgres feature - using in-memory store");
        Self::memory_store(feed)
    }

    fn memory_store(
        feed: Arc<dyn ChangeFeed>,
    ) -> (Arc<dyn BlogRepository>, Arc<dyn ProfileRepository>, &'static str) {
        let store = InMemoryStore::new();
        (
            Arc::new(ChangeNotifier::new(store.blogs(), feed.clone())),
            Arc::new(ChangeNotifier::new(store.profiles(), feed)),
            "memory",
        )
    }
}
