//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of the all-blogs listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// `newest`, `oldest`, `title` or `author`.
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

/// A post as rendered on cards and in the review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogCardResponse {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_username: String,
    pub read_time_minutes: u32,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
}

/// A single post with its full body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDetailResponse {
    #[serde(flatten)]
    pub card: BlogCardResponse,
    pub content: String,
}

/// 1-based inclusive range of the items on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowingRange {
    pub start: usize,
    pub end: usize,
}

/// One page of the curated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPageResponse {
    pub items: Vec<BlogCardResponse>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Absent when nothing matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showing: Option<ShowingRange>,
    pub search: String,
    pub sort: String,
    /// Set when the last fetch failed; `items` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of the admin review page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationQueueResponse {
    pub pending: Vec<BlogCardResponse>,
    pub history: Vec<BlogCardResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Transient operator message after a successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeResponse {
    pub title: String,
    pub description: String,
}

/// Result of a verify action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub notice: NoticeResponse,
    pub blog_id: Uuid,
    pub verified_at: Option<DateTime<Utc>>,
    /// The pending queue as re-fetched after the transition.
    pub pending: Vec<BlogCardResponse>,
}

/// Homepage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub posts: u64,
    pub users: u64,
    pub verified: u64,
}

/// Home page: the newest posts and the counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeResponse {
    pub latest: Vec<BlogCardResponse>,
    pub stats: StatsResponse,
    /// Set when the latest posts could not be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
