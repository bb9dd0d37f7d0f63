//! Redis change feed implementation.
//!
//! Events are JSON-encoded and published on `blogify:changes:<table>`, so every
//! server instance sharing the Redis sees every write.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use blogify_core::ports::{ChangeEvent, ChangeFeed, FeedError, Subscription, Table};

const CHANNEL_PREFIX: &str = "blogify:changes:";

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub connect_timeout: Duration,
}

fn channel_name(table: Table) -> String {
    format!("{CHANNEL_PREFIX}{table}")
}

/// Redis-backed change feed.
pub struct RedisChangeFeed {
    conn: ConnectionManager,
    client: Client,
}

impl RedisChangeFeed {
    pub async fn new(config: RedisConfig) -> Result<Self, FeedError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| FeedError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client.clone());
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| FeedError::Connection("Connection timed out".to_string()))?
            .map_err(|e| FeedError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis change feed");

        Ok(Self { conn, client })
    }
}

#[async_trait]
impl ChangeFeed for RedisChangeFeed {
    async fn publish(&self, event: ChangeEvent) -> Result<(), FeedError> {
        let payload =
            serde_json::to_string(&event).map_err(|e| FeedError::Serialization(e.to_string()))?;
        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(channel_name(event.table), payload)
            .await
            .map_err(|e| FeedError::PublishError(e.to_string()))?;
        Ok(())
    }

    async fn subscribe(&self, table: Table) -> Result<Subscription, FeedError> {
        let channel = channel_name(table);

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))?;
        pubsub
            .subscribe(&channel)
            .await
            .map_err(|e| FeedError::SubscribeError(e.to_string()))?;

        tracing::debug!(channel = %channel, "Subscribed to Redis channel");

        let (tx, rx) = mpsc::unbounded();
        let relay = tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to get message payload");
                        continue;
                    }
                };

                let event: ChangeEvent = match serde_json::from_str(&payload) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping malformed change event");
                        continue;
                    }
                };

                if tx.unbounded_send(event).is_err() {
                    break;
                }
            }

            tracing::info!(channel = %channel, "Change feed connection closed");
        });

        Ok(Subscription::new(table, rx, move || {
            relay.abort();
            tracing::debug!(table = %table, "Unsubscribed from Redis channel");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogify_core::ports::ChangeKind;

    async fn get_test_feed() -> Option<RedisChangeFeed> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
        };

        RedisChangeFeed::new(config).await.ok()
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name(Table::Blogs), "blogify:changes:blogs");
    }

    #[tokio::test]
    async fn test_redis_change_feed() {
        let feed = match get_test_feed().await {
            Some(f) => f,
            None => return,
        };

        let mut subscription = feed.subscribe(Table::Blogs).await.unwrap();

        // Give some time for subscription to stabilize
        tokio::time::sleep(Duration::from_millis(100)).await;

        let event = ChangeEvent::new(Table::Blogs, ChangeKind::Update, None);
        feed.publish(event.clone()).await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), subscription.next_event())
            .await
            .unwrap();
        assert_eq!(received, Some(event));

        subscription.unsubscribe();
    }
}
