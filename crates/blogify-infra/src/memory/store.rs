use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use blogify_core::domain::{BlogEntry, Post, Profile};
use blogify_core::error::RepoError;
use blogify_core::ports::{
    BaseRepository, BlogFilter, BlogQuery, BlogRepository, ProfileRepository, VerifyOutcome,
};

#[derive(Default)]
struct Tables {
    blogs: HashMap<Uuid, Post>,
    profiles: HashMap<Uuid, Profile>,
}

impl Tables {
    fn entry(&self, post: &Post) -> BlogEntry {
        let author = self
            .profiles
            .get(&post.author_id)
            .cloned()
            .unwrap_or_else(|| Profile::placeholder(post.author_id));
        BlogEntry::new(post.clone(), author)
    }
}

/// `blogs` and `profiles` tables held in a `HashMap` behind an async RwLock.
///
/// Note: Data is lost on process restart.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blogs(&self) -> InMemoryBlogRepository {
        InMemoryBlogRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn profiles(&self) -> InMemoryProfileRepository {
        InMemoryProfileRepository {
            tables: self.tables.clone(),
        }
    }
}

/// Blog repository view of an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemoryBlogRepository {
    tables: Arc<RwLock<Tables>>,
}

/// Profile repository view of an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemoryProfileRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryBlogRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.blogs.get(&id).cloned())
    }

    /// Same merge as the PostgreSQL upsert: `created_at` is kept and a
    /// verified row stays verified.
    async fn save(&self, mut entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.blogs.get(&entity.id) {
            entity.created_at = stored.created_at;
            if stored.verified {
                entity.verified = true;
                entity.verification_requested = true;
                entity.verified_at = stored.verified_at;
            }
        }
        tables.blogs.insert(entity.id, entity.clone());
        Ok(entity)
    }
}

#[async_trait]
impl BlogRepository for InMemoryBlogRepository {
    async fn query(&self, query: BlogQuery) -> Result<Vec<BlogEntry>, RepoError> {
        let tables = self.tables.read().await;
        let entries: Vec<BlogEntry> = tables
            .blogs
            .values()
            .filter(|post| query.filter.matches(post))
            .map(|post| tables.entry(post))
            .collect();
        Ok(query.apply(entries))
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<BlogEntry>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.blogs.get(&id).map(|post| tables.entry(post)))
    }

    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<VerifyOutcome, RepoError> {
        // Check and write under one lock.
        let mut tables = self.tables.write().await;
        let Some(post) = tables.blogs.get_mut(&id) else {
            return Ok(VerifyOutcome::NotFound);
        };
        Ok(match post.mark_verified(at) {
            Ok(true) => VerifyOutcome::Verified(post.clone()),
            Ok(false) => VerifyOutcome::AlreadyVerified(post.clone()),
            Err(_) => VerifyOutcome::NotRequested(post.clone()),
        })
    }

    async fn count(&self, filter: BlogFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.blogs.values().filter(|post| filter.matches(post)).count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Profile, Uuid> for InMemoryProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn save(&self, mut entity: Profile) -> Result<Profile, RepoError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .profiles
            .values()
            .any(|p| p.username == entity.username && p.user_id != entity.user_id);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                entity.username
            )));
        }
        if let Some(stored) = tables.profiles.get(&entity.user_id) {
            entity.created_at = stored.created_at;
        }
        tables.profiles.insert(entity.user_id, entity.clone());
        Ok(entity)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.username == username)
            .cloned())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.profiles.len() as u64)
    }
}
