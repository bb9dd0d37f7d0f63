//! Change feed port - table change notifications ("realtime").

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tables that emit change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Blogs,
    Profiles,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blogs => "blogs",
            Self::Profiles => "profiles",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blogs" => Ok(Self::Blogs),
            "profiles" => Ok(Self::Profiles),
            other => Err(FeedError::UnknownTable(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single row change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub row_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(table: Table, kind: ChangeKind, row_id: Option<Uuid>) -> Self {
        Self {
            table,
            kind,
            row_id,
            at: Utc::now(),
        }
    }
}

type Release = Box<dyn FnOnce() + Send>;

/// Scoped handle on one table's change stream.
///
/// The release hook runs exactly once: on [`Subscription::unsubscribe`] or
/// when the handle is dropped, whichever comes first.
pub struct Subscription {
    table: Table,
    events: UnboundedReceiver<ChangeEvent>,
    release: Option<Release>,
}

impl Subscription {
    pub fn new(
        table: Table,
        events: UnboundedReceiver<ChangeEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            table,
            events,
            release: Some(Box::new(release)),
        }
    }

    /// Wait for the next change. `None` once the feed has closed.
    pub async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.events.next().await
    }

    /// Release the subscription now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            self.events.close();
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("table", &self.table)
            .field("released", &self.release.is_none())
            .finish()
    }
}

impl Stream for Subscription {
    type Item = ChangeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Change feed trait - abstraction over realtime backends.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Broadcast a change to current subscribers of its table.
    async fn publish(&self, event: ChangeEvent) -> Result<(), FeedError>;

    /// Open a scoped subscription to one table.
    async fn subscribe(&self, table: Table) -> Result<Subscription, FeedError>;
}

/// Change feed errors.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to publish: {0}")]
    PublishError(String),

    #[error("Failed to subscribe: {0}")]
    SubscribeError(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Malformed change event: {0}")]
    Serialization(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),
}
