use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{BlogEntry, Post, Profile};
use crate::error::RepoError;

/// Generic repository trait defining the operations every table supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;
}

/// Boolean equality filters over the `blogs` table. `None` leaves a column
/// unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub published: Option<bool>,
    pub verified: Option<bool>,
    pub verification_requested: Option<bool>,
}

impl BlogFilter {
    /// Every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn published() -> Self {
        Self {
            published: Some(true),
            ..Self::default()
        }
    }

    /// `published AND verified`.
    pub fn curated() -> Self {
        Self {
            published: Some(true),
            verified: Some(true),
            ..Self::default()
        }
    }

    /// `verification_requested AND NOT verified`.
    pub fn pending() -> Self {
        Self {
            verified: Some(false),
            verification_requested: Some(true),
            ..Self::default()
        }
    }

    pub fn verified() -> Self {
        Self {
            verified: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        fn check(want: Option<bool>, actual: bool) -> bool {
            want.is_none_or(|want| want == actual)
        }
        check(self.published, post.published)
            && check(self.verified, post.verified)
            && check(self.verification_requested, post.verification_requested)
    }
}

/// Orderable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogOrder {
    CreatedAt,
    VerifiedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A row query against `blogs`, joined with one profile per post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogQuery {
    pub filter: BlogFilter,
    pub order: Option<(BlogOrder, Direction)>,
    pub limit: Option<u64>,
}

impl BlogQuery {
    pub fn new(filter: BlogFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn order_by(mut self, column: BlogOrder, direction: Direction) -> Self {
        self.order = Some((column, direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the query over already-loaded entries.
    ///
    /// Rows without the ordering timestamp sort last in either direction.
    pub fn apply(&self, entries: impl IntoIterator<Item = BlogEntry>) -> Vec<BlogEntry> {
        let mut rows: Vec<BlogEntry> = entries
            .into_iter()
            .filter(|entry| self.filter.matches(&entry.post))
            .collect();

        if let Some((column, direction)) = self.order {
            rows.sort_by(|a, b| {
                let (a, b) = match column {
                    BlogOrder::CreatedAt => (Some(a.post.created_at), Some(b.post.created_at)),
                    BlogOrder::VerifiedAt => (a.post.verified_at, b.post.verified_at),
                };
                compare_timestamps(a, b, direction)
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        rows
    }
}

fn compare_timestamps(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    direction: Direction,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            Direction::Ascending => a.cmp(&b),
            Direction::Descending => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Result of the conditional verify update.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    /// The post was pending and is now verified.
    Verified(Post),
    /// The post was verified before this call; nothing changed.
    AlreadyVerified(Post),
    /// The author never requested review; nothing changed.
    NotRequested(Post),
    NotFound,
}

/// Blog post repository.
#[async_trait]
pub trait BlogRepository: BaseRepository<Post, Uuid> {
    /// Run a filtered, ordered, limited query joined with author profiles.
    async fn query(&self, query: BlogQuery) -> Result<Vec<BlogEntry>, RepoError>;

    /// One post joined with its author.
    async fn find_entry(&self, id: Uuid) -> Result<Option<BlogEntry>, RepoError>;

    /// Set `verified` and `verified_at` only if the post is still pending.
    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<VerifyOutcome, RepoError>;

    async fn count(&self, filter: BlogFilter) -> Result<u64, RepoError>;
}

/// Profile repository.
#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(title: &str, offset_minutes: i64) -> BlogEntry {
        let author = Profile::new(Uuid::new_v4(), "author");
        let mut post = Post::new(author.user_id, title, "content");
        post.created_at = Utc::now() - Duration::minutes(offset_minutes);
        BlogEntry::new(post, author)
    }

    #[test]
    fn test_filter_matches_pending_only() {
        let mut post = entry("p", 0).post;
        assert!(!BlogFilter::pending().matches(&post));
        post.verification_requested = true;
        assert!(BlogFilter::pending().matches(&post));
        post.verified = true;
        assert!(!BlogFilter::pending().matches(&post));
        assert!(BlogFilter::all().matches(&post));
    }

    #[test]
    fn test_apply_orders_and_limits() {
        let rows = vec![entry("old", 30), entry("new", 1), entry("mid", 10)];
        let result = BlogQuery::new(BlogFilter::all())
            .order_by(BlogOrder::CreatedAt, Direction::Descending)
            .limit(2)
            .apply(rows);

        let titles: Vec<_> = result.iter().map(|e| e.post.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid"]);
    }

    #[test]
    fn test_missing_verified_at_sorts_last() {
        let mut stamped = entry("stamped", 0);
        stamped.post.verified_at = Some(Utc::now());
        let unstamped = entry("unstamped", 0);

        for direction in [Direction::Ascending, Direction::Descending] {
            let result = BlogQuery::new(BlogFilter::all())
                .order_by(BlogOrder::VerifiedAt, direction)
                .apply(vec![unstamped.clone(), stamped.clone()]);
            assert_eq!(result[0].post.title, "stamped");
        }
    }
}
