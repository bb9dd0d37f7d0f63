//! Admin verification workflow: the pending queue, verified history and the
//! `Pending -> Verified` transition.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BlogEntry, Post, VerificationState};
use crate::error::DomainError;
use crate::ports::{BlogFilter, BlogOrder, BlogQuery, BlogRepository, Direction, Subscription, VerifyOutcome};

/// Size of the recently-verified section.
pub const DEFAULT_HISTORY_LIMIT: u64 = 20;

/// Queries and the single transition of the verification workflow.
#[derive(Clone)]
pub struct VerificationWorkflow {
    blogs: Arc<dyn BlogRepository>,
    history_limit: u64,
}

impl VerificationWorkflow {
    pub fn new(blogs: Arc<dyn BlogRepository>) -> Self {
        Self {
            blogs,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: u64) -> Self {
        self.history_limit = limit;
        self
    }

    /// Every post awaiting review, newest request first. Unbounded.
    pub async fn list_pending(&self) -> Result<Vec<BlogEntry>, DomainError> {
        let query = BlogQuery::new(BlogFilter::pending())
            .order_by(BlogOrder::CreatedAt, Direction::Descending);
        Ok(self.blogs.query(query).await?)
    }

    /// The most recently verified posts, at most `history_limit`.
    pub async fn list_verified_history(&self) -> Result<Vec<BlogEntry>, DomainError> {
        let query = BlogQuery::new(BlogFilter::verified())
            .order_by(BlogOrder::VerifiedAt, Direction::Descending)
            .limit(self.history_limit);
        Ok(self.blogs.query(query).await?)
    }

    /// Move a pending post to verified.
    ///
    /// Verifying a post that is already verified succeeds without touching
    /// `verified_at`.
    pub async fn verify(&self, id: Uuid) -> Result<Post, DomainError> {
        match self.blogs.mark_verified(id, Utc::now()).await? {
            VerifyOutcome::Verified(post) => {
                tracing::info!(post_id = %id, "Post verified");
                Ok(post)
            }
            VerifyOutcome::AlreadyVerified(post) => {
                tracing::debug!(post_id = %id, "Post was already verified");
                Ok(post)
            }
            VerifyOutcome::NotRequested(_) => Err(DomainError::InvalidTransition {
                id,
                state: VerificationState::Unrequested,
            }),
            VerifyOutcome::NotFound => Err(DomainError::NotFound {
                entity_type: "blog",
                id,
            }),
        }
    }
}

/// Transient message shown to the operator after a successful action.
///
/// Failures reach the operator as the error itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn verified() -> Self {
        Self {
            title: "Verified".to_string(),
            description: "Blog marked as verified.".to_string(),
        }
    }
}

/// View state of the admin verification page.
pub struct VerificationQueue {
    workflow: VerificationWorkflow,
    pending: Vec<BlogEntry>,
    history: Vec<BlogEntry>,
    error: Option<String>,
    fetching: bool,
}

impl VerificationQueue {
    pub fn new(workflow: VerificationWorkflow) -> Self {
        Self {
            workflow,
            pending: Vec::new(),
            history: Vec::new(),
            error: None,
            fetching: true,
        }
    }

    pub fn pending(&self) -> &[BlogEntry] {
        &self.pending
    }

    pub fn history(&self) -> &[BlogEntry] {
        &self.history
    }

    /// Page-level error from the last pending fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Re-run both listings.
    pub async fn refresh(&mut self) {
        let workflow = self.workflow.clone();
        let (pending, history) =
            futures::join!(workflow.list_pending(), workflow.list_verified_history());
        self.apply_pending(pending);
        self.apply_history(history);
    }

    /// Re-run the pending listing only.
    pub async fn refresh_pending(&mut self) {
        self.fetching = true;
        let pending = self.workflow.list_pending().await;
        self.apply_pending(pending);
    }

    /// Verify a post. Only a successful transition refreshes the queue.
    pub async fn verify(&mut self, id: Uuid) -> Result<Post, DomainError> {
        let result = self.workflow.verify(id).await;
        match &result {
            Ok(_) => self.refresh_pending().await,
            Err(e) => tracing::warn!(post_id = %id, error = %e, "Verification failed"),
        }
        result
    }

    /// Wait for the next change on `subscription`, then refresh both lists.
    ///
    /// Returns `false` once the feed has closed.
    pub async fn follow(&mut self, subscription: &mut Subscription) -> bool {
        match subscription.next_event().await {
            Some(event) => {
                tracing::debug!(table = %event.table, kind = ?event.kind, "Change received, refreshing queue");
                self.refresh().await;
                true
            }
            None => false,
        }
    }

    fn apply_pending(&mut self, result: Result<Vec<BlogEntry>, DomainError>) {
        match result {
            Ok(pending) => {
                self.pending = pending;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch pending posts");
                self.pending.clear();
                self.error = Some(e.to_string());
            }
        }
        self.fetching = false;
    }

    fn apply_history(&mut self, result: Result<Vec<BlogEntry>, DomainError>) {
        match result {
            Ok(history) => self.history = history,
            Err(e) => {
                // Never blocks the page.
                tracing::warn!(error = %e, "Failed to fetch verification history");
                self.history.clear();
            }
        }
    }
}
