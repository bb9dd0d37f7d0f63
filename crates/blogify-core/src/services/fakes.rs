//! In-process repositories for service tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{BlogEntry, Post, Profile};
use crate::error::RepoError;
use crate::ports::{
    BaseRepository, BlogFilter, BlogQuery, BlogRepository, ProfileRepository, VerifyOutcome,
};

pub struct FakeBlogs {
    rows: Mutex<Vec<(Post, Profile)>>,
    fail_query: Option<fn(&BlogQuery) -> bool>,
    fail_writes: AtomicBool,
    fail_counts: AtomicBool,
}

impl FakeBlogs {
    pub fn with(rows: Vec<(Post, Profile)>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail_query: None,
            fail_writes: AtomicBool::new(false),
            fail_counts: AtomicBool::new(false),
        }
    }

    pub fn failing_when(mut self, predicate: fn(&BlogQuery) -> bool) -> Self {
        self.fail_query = Some(predicate);
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, post: Post, author: Profile) {
        self.rows.lock().unwrap().push((post, author));
    }

    fn entries(&self) -> Vec<BlogEntry> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|(post, author)| BlogEntry::new(post.clone(), author.clone()))
            .collect()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for FakeBlogs {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.find_entry(id).await?.map(|e| e.post))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|(post, _)| post.id == entity.id) {
            Some((post, _)) => *post = entity.clone(),
            None => {
                let author = Profile::placeholder(entity.author_id);
                rows.push((entity.clone(), author));
            }
        }
        Ok(entity)
    }
}

#[async_trait]
impl BlogRepository for FakeBlogs {
    async fn query(&self, query: BlogQuery) -> Result<Vec<BlogEntry>, RepoError> {
        if self.fail_query.is_some_and(|fail| fail(&query)) {
            return Err(RepoError::Connection("store unreachable".to_string()));
        }
        Ok(query.apply(self.entries()))
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<BlogEntry>, RepoError> {
        Ok(self.entries().into_iter().find(|e| e.post.id == id))
    }

    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<VerifyOutcome, RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Query("update rejected".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let Some((post, _)) = rows.iter_mut().find(|(post, _)| post.id == id) else {
            return Ok(VerifyOutcome::NotFound);
        };
        Ok(match post.mark_verified(at) {
            Ok(true) => VerifyOutcome::Verified(post.clone()),
            Ok(false) => VerifyOutcome::AlreadyVerified(post.clone()),
            Err(_) => VerifyOutcome::NotRequested(post.clone()),
        })
    }

    async fn count(&self, filter: BlogFilter) -> Result<u64, RepoError> {
        if self.fail_counts.load(Ordering::SeqCst) {
            return Err(RepoError::Connection("store unreachable".to_string()));
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|(post, _)| filter.matches(post)).count() as u64)
    }
}

pub struct FakeProfiles {
    rows: Mutex<Vec<Profile>>,
}

impl FakeProfiles {
    pub fn with(rows: Vec<Profile>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl BaseRepository<Profile, Uuid> for FakeProfiles {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.user_id == id).cloned())
    }

    async fn save(&self, entity: Profile) -> Result<Profile, RepoError> {
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }
}

#[async_trait]
impl ProfileRepository for FakeProfiles {
    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.username == username).cloned())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}
