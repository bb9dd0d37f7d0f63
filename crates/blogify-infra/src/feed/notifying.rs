//! Store decorator that publishes a change event after every successful write.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use blogify_core::domain::{BlogEntry, Post, Profile};
use blogify_core::error::RepoError;
use blogify_core::ports::{
    BaseRepository, BlogFilter, BlogQuery, BlogRepository, ChangeEvent, ChangeFeed, ChangeKind,
    ProfileRepository, Table, VerifyOutcome,
};

/// Entities whose writes are announced on the feed.
pub trait ChangeTracked {
    const TABLE: Table;

    fn row_id(&self) -> Uuid;
}

impl ChangeTracked for Post {
    const TABLE: Table = Table::Blogs;

    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl ChangeTracked for Profile {
    const TABLE: Table = Table::Profiles;

    fn row_id(&self) -> Uuid {
        self.user_id
    }
}

/// Wraps a repository and announces its writes.
///
/// Publish failures are logged; the write itself has already succeeded.
pub struct ChangeNotifier<R> {
    inner: R,
    feed: Arc<dyn ChangeFeed>,
}

impl<R> ChangeNotifier<R> {
    pub fn new(inner: R, feed: Arc<dyn ChangeFeed>) -> Self {
        Self { inner, feed }
    }

    async fn announce(&self, table: Table, kind: ChangeKind, row_id: Uuid) {
        let event = ChangeEvent::new(table, kind, Some(row_id));
        if let Err(e) = self.feed.publish(event).await {
            tracing::warn!(table = %table, row_id = %row_id, error = %e, "Failed to publish change");
        }
    }
}

#[async_trait]
impl<T, R> BaseRepository<T, Uuid> for ChangeNotifier<R>
where
    T: ChangeTracked + Send + Sync + 'static,
    R: BaseRepository<T, Uuid>,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let id = entity.row_id();
        let kind = match self.inner.find_by_id(id).await? {
            Some(_) => ChangeKind::Update,
            None => ChangeKind::Insert,
        };
        let saved = self.inner.save(entity).await?;
        self.announce(T::TABLE, kind, id).await;
        Ok(saved)
    }
}

#[async_trait]
impl<R: BlogRepository> BlogRepository for ChangeNotifier<R> {
    async fn query(&self, query: BlogQuery) -> Result<Vec<BlogEntry>, RepoError> {
        self.inner.query(query).await
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<BlogEntry>, RepoError> {
        self.inner.find_entry(id).await
    }

    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<VerifyOutcome, RepoError> {
        let outcome = self.inner.mark_verified(id, at).await?;
        if matches!(outcome, VerifyOutcome::Verified(_)) {
            self.announce(Table::Blogs, ChangeKind::Update, id).await;
        }
        Ok(outcome)
    }

    async fn count(&self, filter: BlogFilter) -> Result<u64, RepoError> {
        self.inner.count(filter).await
    }
}

#[async_trait]
impl<R: ProfileRepository> ProfileRepository for ChangeNotifier<R> {
    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, RepoError> {
        self.inner.find_by_username(username).await
    }

    async fn count(&self) -> Result<u64, RepoError> {
        self.inner.count().await
    }
}
