use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Characters of content shown when a post has no excerpt.
pub const SUMMARY_CHARS: usize = 140;

const CHARS_PER_MINUTE: usize = 200;

/// Where a post sits in the review workflow, derived from its two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    /// The author has not asked for review.
    Unrequested,
    /// Review requested, not yet approved.
    Pending,
    /// Approved. Terminal.
    Verified,
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unrequested => "unrequested",
            Self::Pending => "pending",
            Self::Verified => "verified",
        };
        f.write_str(label)
    }
}

/// Post entity - a blog entry with publication and verification flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// `user_id` of the authoring profile.
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: bool,
    pub verified: bool,
    pub verification_requested: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub background_image_url: Option<String>,
}

impl Post {
    /// Create a new unpublished, unrequested post.
    pub fn new(author_id: Uuid, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: title.into(),
            content: content.into(),
            excerpt: None,
            published: false,
            verified: false,
            verification_requested: false,
            verified_at: None,
            created_at: Utc::now(),
            background_image_url: None,
        }
    }

    pub fn verification_state(&self) -> VerificationState {
        match (self.verified, self.verification_requested) {
            (true, _) => VerificationState::Verified,
            (false, true) => VerificationState::Pending,
            (false, false) => VerificationState::Unrequested,
        }
    }

    /// Visible in general listings.
    pub fn is_publicly_listed(&self) -> bool {
        self.published
    }

    /// Visible in the curated all-blogs listing.
    pub fn is_curated(&self) -> bool {
        self.published && self.verified
    }

    /// Waiting in the admin queue.
    pub fn is_pending(&self) -> bool {
        self.verification_state() == VerificationState::Pending
    }

    /// Author asks for review: `Unrequested -> Pending`.
    ///
    /// Asking again while pending is a no-op.
    pub fn request_verification(&mut self) -> Result<(), DomainError> {
        match self.verification_state() {
            VerificationState::Unrequested => {
                self.verification_requested = true;
                Ok(())
            }
            VerificationState::Pending => Ok(()),
            state @ VerificationState::Verified => Err(DomainError::InvalidTransition {
                id: self.id,
                state,
            }),
        }
    }

    /// Apply `Pending -> Verified`, stamping `verified_at`.
    ///
    /// Returns `Ok(false)` when the post was already verified; the original
    /// timestamp is kept.
    pub fn mark_verified(&mut self, at: DateTime<Utc>) -> Result<bool, DomainError> {
        match self.verification_state() {
            VerificationState::Pending => {
                self.verified = true;
                self.verified_at = Some(at);
                Ok(true)
            }
            VerificationState::Verified => Ok(false),
            state @ VerificationState::Unrequested => Err(DomainError::InvalidTransition {
                id: self.id,
                state,
            }),
        }
    }

    /// The excerpt, or the leading characters of the content.
    pub fn summary(&self) -> &str {
        if let Some(excerpt) = self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            return excerpt;
        }
        match self.content.char_indices().nth(SUMMARY_CHARS) {
            Some((cut, _)) => &self.content[..cut],
            None => &self.content,
        }
    }

    pub fn read_time_minutes(&self) -> u32 {
        let chars = self.content.chars().count();
        chars.div_ceil(CHARS_PER_MINUTE).max(1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post::new(Uuid::new_v4(), "Title", "Body")
    }

    #[test]
    fn test_new_post_is_unrequested() {
        let post = post();
        assert_eq!(post.verification_state(), VerificationState::Unrequested);
        assert!(!post.is_publicly_listed());
        assert!(post.verified_at.is_none());
    }

    #[test]
    fn test_request_then_verify() {
        let mut post = post();
        post.request_verification().unwrap();
        assert!(post.is_pending());

        let now = Utc::now();
        assert!(post.mark_verified(now).unwrap());
        assert_eq!(post.verification_state(), VerificationState::Verified);
        assert_eq!(post.verified_at, Some(now));
    }

    #[test]
    fn test_verify_twice_keeps_first_timestamp() {
        let mut post = post();
        post.request_verification().unwrap();
        let first = Utc::now();
        post.mark_verified(first).unwrap();

        let later = first + chrono::Duration::minutes(5);
        assert!(!post.mark_verified(later).unwrap());
        assert_eq!(post.verified_at, Some(first));
    }

    #[test]
    fn test_verify_unrequested_is_rejected() {
        let mut post = post();
        let err = post.mark_verified(Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                state: VerificationState::Unrequested,
                ..
            }
        ));
        assert!(!post.verified);
    }

    #[test]
    fn test_request_after_verified_is_rejected() {
        let mut post = post();
        post.request_verification().unwrap();
        post.mark_verified(Utc::now()).unwrap();
        assert!(post.request_verification().is_err());
    }

    #[test]
    fn test_curated_requires_published_and_verified() {
        let mut post = post();
        post.verification_requested = true;
        post.mark_verified(Utc::now()).unwrap();
        assert!(!post.is_curated());
        post.published = true;
        assert!(post.is_curated());
    }

    #[test]
    fn test_summary_prefers_excerpt() {
        let mut post = post();
        post.content = "x".repeat(300);
        assert_eq!(post.summary().chars().count(), SUMMARY_CHARS);

        post.excerpt = Some("Short intro".to_string());
        assert_eq!(post.summary(), "Short intro");
    }

    #[test]
    fn test_summary_respects_char_boundaries() {
        let mut post = post();
        post.content = "é".repeat(SUMMARY_CHARS + 10);
        assert_eq!(post.summary().chars().count(), SUMMARY_CHARS);
    }

    #[test]
    fn test_read_time() {
        let mut post = post();
        assert_eq!(post.read_time_minutes(), 1);
        post.content = "a".repeat(401);
        assert_eq!(post.read_time_minutes(), 3);
    }
}
