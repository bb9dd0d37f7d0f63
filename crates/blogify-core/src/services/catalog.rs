//! Read-side queries for public pages: the curated listing, the home feed and
//! site statistics.

use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::BlogEntry;
use crate::error::{DomainError, RepoError};
use crate::ports::{
    BlogFilter, BlogOrder, BlogQuery, BlogRepository, Direction, ProfileRepository, Subscription,
};

/// Posts shown on the home page.
pub const LATEST_LIMIT: u64 = 6;

/// Homepage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStats {
    pub posts: u64,
    pub users: u64,
    pub verified: u64,
}

/// Public read access to blogs.
#[derive(Clone)]
pub struct BlogCatalog {
    blogs: Arc<dyn BlogRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl BlogCatalog {
    pub fn new(blogs: Arc<dyn BlogRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { blogs, profiles }
    }

    /// Published and verified posts, newest first.
    pub async fn curated(&self) -> Result<Vec<BlogEntry>, DomainError> {
        let query = BlogQuery::new(BlogFilter::curated())
            .order_by(BlogOrder::CreatedAt, Direction::Descending);
        Ok(self.blogs.query(query).await?)
    }

    /// The newest published posts, verified or not.
    pub async fn latest(&self, limit: u64) -> Result<Vec<BlogEntry>, DomainError> {
        let query = BlogQuery::new(BlogFilter::published())
            .order_by(BlogOrder::CreatedAt, Direction::Descending)
            .limit(limit);
        Ok(self.blogs.query(query).await?)
    }

    /// A single publicly listed post.
    pub async fn published_entry(&self, id: Uuid) -> Result<BlogEntry, DomainError> {
        self.blogs
            .find_entry(id)
            .await?
            .filter(|entry| entry.post.is_publicly_listed())
            .ok_or(DomainError::NotFound {
                entity_type: "blog",
                id,
            })
    }

    /// Row counts. A failing count reads as zero.
    pub async fn stats(&self) -> SiteStats {
        let (posts, users, verified) = futures::join!(
            self.blogs.count(BlogFilter::all()),
            self.profiles.count(),
            self.blogs.count(BlogFilter::verified()),
        );
        SiteStats {
            posts: or_zero("posts", posts),
            users: or_zero("users", users),
            verified: or_zero("verified", verified),
        }
    }
}

/// Home page state: the newest posts and the site counters.
///
/// Both depend on `blogs` and `profiles`, so a change to either table reloads
/// the whole feed.
#[derive(Debug, Default)]
pub struct HomeFeed {
    latest: Vec<BlogEntry>,
    stats: SiteStats,
    error: Option<String>,
}

impl HomeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> &[BlogEntry] {
        &self.latest
    }

    pub fn stats(&self) -> SiteStats {
        self.stats
    }

    /// Set when the latest-posts query failed. Counters never fail.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn reload(&mut self, catalog: &BlogCatalog) {
        let (latest, stats) = futures::join!(catalog.latest(LATEST_LIMIT), catalog.stats());
        self.stats = stats;
        match latest {
            Ok(latest) => {
                self.latest = latest;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch latest posts");
                self.latest.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    /// Wait for a change on either subscription, then reload.
    ///
    /// Returns `false` once both feeds have closed.
    pub async fn follow(
        &mut self,
        catalog: &BlogCatalog,
        blogs: &mut Subscription,
        profiles: &mut Subscription,
    ) -> bool {
        let event = futures::stream::select(blogs, profiles).next().await;
        match event {
            Some(event) => {
                tracing::debug!(table = %event.table, kind = ?event.kind, "Change received, reloading home feed");
                self.reload(catalog).await;
                true
            }
            None => false,
        }
    }
}

fn or_zero(counter: &'static str, result: Result<u64, RepoError>) -> u64 {
    result.unwrap_or_else(|e| {
        tracing::warn!(counter, error = %e, "Count query failed");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Post, Profile};
    use crate::ports::{ChangeEvent, ChangeKind, Table};
    use crate::services::fakes::{FakeBlogs, FakeProfiles};
    use chrono::{Duration, Utc};
    use futures::channel::mpsc;

    fn row(title: &str, published: bool, verified: bool, age_minutes: i64) -> (Post, Profile) {
        let author = Profile::new(Uuid::new_v4(), "writer");
        let mut post = Post::new(author.user_id, title, "content");
        post.published = published;
        post.verification_requested = verified;
        post.verified = verified;
        post.verified_at = verified.then(Utc::now);
        post.created_at = Utc::now() - Duration::minutes(age_minutes);
        (post, author)
    }

    fn catalog(blogs: FakeBlogs, profiles: usize) -> (Arc<FakeBlogs>, BlogCatalog) {
        let blogs = Arc::new(blogs);
        let profiles = (0..profiles)
            .map(|i| Profile::new(Uuid::new_v4(), format!("user{i}")))
            .collect();
        let catalog = BlogCatalog::new(blogs.clone(), Arc::new(FakeProfiles::with(profiles)));
        (blogs, catalog)
    }

    #[tokio::test]
    async fn test_curated_requires_published_and_verified() {
        let (_, catalog) = catalog(
            FakeBlogs::with(vec![
                row("curated", true, true, 1),
                row("unverified", true, false, 2),
                row("draft", false, true, 3),
            ]),
            0,
        );
        let curated = catalog.curated().await.unwrap();
        assert_eq!(curated.len(), 1);
        assert_eq!(curated[0].post.title, "curated");
    }

    #[tokio::test]
    async fn test_latest_is_limited_and_ignores_verification() {
        let rows = (0..8).map(|i| row(&format!("p{i}"), true, i % 2 == 0, i)).collect();
        let (_, catalog) = catalog(FakeBlogs::with(rows), 0);

        let latest = catalog.latest(LATEST_LIMIT).await.unwrap();
        assert_eq!(latest.len(), 6);
        assert_eq!(latest[0].post.title, "p0");
        assert_eq!(latest[1].post.title, "p1");
    }

    #[tokio::test]
    async fn test_published_entry_hides_drafts() {
        let (draft, author) = row("draft", false, false, 1);
        let (_, catalog) = catalog(FakeBlogs::with(vec![(draft.clone(), author)]), 0);
        assert!(matches!(
            catalog.published_entry(draft.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_stats_counts_and_degrades_to_zero() {
        let (blogs, catalog) = catalog(
            FakeBlogs::with(vec![row("a", true, true, 1), row("b", true, false, 2)]),
            3,
        );
        assert_eq!(
            catalog.stats().await,
            SiteStats {
                posts: 2,
                users: 3,
                verified: 1
            }
        );

        blogs.fail_counts(true);
        let stats = catalog.stats().await;
        assert_eq!(stats.posts, 0);
        assert_eq!(stats.verified, 0);
        assert_eq!(stats.users, 3);
    }

    fn subscription(table: Table) -> (mpsc::UnboundedSender<ChangeEvent>, Subscription) {
        let (tx, rx) = mpsc::unbounded();
        (tx, Subscription::new(table, rx, || {}))
    }

    #[tokio::test]
    async fn test_home_feed_reloads_on_either_table() {
        let (blogs, catalog) = catalog(FakeBlogs::with(vec![row("first", true, false, 5)]), 1);
        let (blog_tx, mut blog_changes) = subscription(Table::Blogs);
        let (profile_tx, mut profile_changes) = subscription(Table::Profiles);

        let mut home = HomeFeed::new();
        home.reload(&catalog).await;
        assert_eq!(home.latest().len(), 1);
        assert_eq!(home.stats().posts, 1);

        let (post, author) = row("second", true, false, 1);
        blogs.insert(post, author);
        blog_tx
            .unbounded_send(ChangeEvent::new(Table::Blogs, ChangeKind::Insert, None))
            .unwrap();
        assert!(home.follow(&catalog, &mut blog_changes, &mut profile_changes).await);
        assert_eq!(home.latest()[0].post.title, "second");
        assert_eq!(home.stats().posts, 2);

        blogs.fail_counts(true);
        profile_tx
            .unbounded_send(ChangeEvent::new(Table::Profiles, ChangeKind::Insert, None))
            .unwrap();
        assert!(home.follow(&catalog, &mut blog_changes, &mut profile_changes).await);
        assert_eq!(home.stats().posts, 0);
        assert_eq!(home.stats().users, 1);
        assert!(home.error().is_none());

        drop(blog_tx);
        drop(profile_tx);
        assert!(!home.follow(&catalog, &mut blog_changes, &mut profile_changes).await);
    }

    #[tokio::test]
    async fn test_home_feed_keeps_counters_when_latest_fails() {
        let blogs = FakeBlogs::with(vec![row("only", true, true, 1)]).failing_when(|_| true);
        let (_, catalog) = catalog(blogs, 2);

        let mut home = HomeFeed::new();
        home.reload(&catalog).await;
        assert!(home.latest().is_empty());
        assert!(home.error().is_some());
        assert_eq!(home.stats().users, 2);
        assert_eq!(home.stats().posts, 1);
    }
}
