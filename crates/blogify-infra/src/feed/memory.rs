//! In-memory change feed.
//!
//! This is a fallback when Redis is not available.
//! Works within a single process only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::channel::mpsc;
use tokio::sync::{RwLock, broadcast};

use blogify_core::ports::{ChangeEvent, ChangeFeed, FeedError, Subscription, Table};

/// In-memory change feed backed by one broadcast channel per table.
pub struct InMemoryChangeFeed {
    channels: Arc<RwLock<HashMap<Table, broadcast::Sender<ChangeEvent>>>>,
    buffer_size: usize,
}

impl InMemoryChangeFeed {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            buffer_size,
        }
    }
}

impl Default for InMemoryChangeFeed {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl ChangeFeed for InMemoryChangeFeed {
    async fn publish(&self, event: ChangeEvent) -> Result<(), FeedError> {
        let channels = self.channels.read().await;

        if let Some(sender) = channels.get(&event.table) {
            let table = event.table;
            // Ignore send errors (no subscribers)
            let receivers = sender.send(event).unwrap_or(0);
            tracing::debug!(table = %table, receivers, "Change published");
        } else {
            tracing::debug!(table = %event.table, "No subscribers for table");
        }

        Ok(())
    }

    async fn subscribe(&self, table: Table) -> Result<Subscription, FeedError> {
        let mut channels = self.channels.write().await;

        // Create channel if it doesn't exist
        let sender = channels
            .entry(table)
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);

        let mut receiver = sender.subscribe();
        let (tx, rx) = mpsc::unbounded();

        let relay = tokio::spawn(async move {
            tracing::info!(table = %table, "Subscribed to table changes");

            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if tx.unbounded_send(event).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            table = %table,
                            lagged = count,
                            "Subscriber lagged behind"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!(table = %table, "Channel closed");
                        break;
                    }
                }
            }
        });

        Ok(Subscription::new(table, rx, move || {
            relay.abort();
            tracing::info!(table = %table, "Unsubscribed from table changes");
        }))
    }
}
