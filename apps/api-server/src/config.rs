//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use blogify_core::services::{DEFAULT_HISTORY_LIMIT, DEFAULT_PAGE_SIZE};
use blogify_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisSettings>,
    pub views: ViewSettings,
}

/// Where to reach the shared change feed.
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub connect_timeout: Duration,
}

/// Knobs of the per-client views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    pub page_size: usize,
    pub history_limit: u64,
    /// Role an identity must carry to use the review queue. Any signed-in
    /// identity may when unset.
    pub verifier_role: Option<String>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            verifier_role: None,
        }
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
        });

        let redis = env::var("REDIS_URL").ok().map(|url| RedisSettings {
            url,
            connect_timeout: Duration::from_millis(parsed("REDIS_CONNECT_TIMEOUT_MS", 2000)),
        });

        let views = ViewSettings {
            page_size: parsed("BLOGS_PAGE_SIZE", DEFAULT_PAGE_SIZE).max(1),
            history_limit: parsed("VERIFIED_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT),
            verifier_role: env::var("VERIFIER_ROLE")
                .ok()
                .filter(|role| !role.trim().is_empty()),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            redis,
            views,
        }
    }
}
