//! Blog listing engine: search, sort and pagination over the curated set.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::catalog::BlogCatalog;
use crate::domain::BlogEntry;
use crate::error::DomainError;
use crate::ports::Subscription;

pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Listing order. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// `created_at` descending.
    #[default]
    Newest,
    /// `created_at` ascending.
    Oldest,
    /// Title, case-insensitive A-Z.
    Title,
    /// Author display name, case-insensitive A-Z.
    Author,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
            Self::Author => "author",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            other => Err(DomainError::Validation(format!(
                "unknown sort key '{other}', expected newest, oldest, title or author"
            ))),
        }
    }
}

/// Case-insensitive substring match on title, content or author name.
pub fn matches_search(entry: &BlogEntry, term: &str) -> bool {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        entry.post.title.as_str(),
        entry.post.content.as_str(),
        entry.author_name(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Stable sort; ties keep their fetched order.
pub fn sort_entries(entries: &mut [BlogEntry], key: SortKey) {
    fn caseless(a: &str, b: &str) -> Ordering {
        a.to_lowercase().cmp(&b.to_lowercase())
    }

    match key {
        SortKey::Newest => entries.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at)),
        SortKey::Oldest => entries.sort_by(|a, b| a.post.created_at.cmp(&b.post.created_at)),
        SortKey::Title => entries.sort_by(|a, b| caseless(&a.post.title, &b.post.title)),
        SortKey::Author => entries.sort_by(|a, b| caseless(a.author_name(), b.author_name())),
    }
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number after clamping.
    pub number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// 1-based inclusive range of the items shown, `None` when empty.
    pub fn showing(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.number - 1) * self.page_size + 1;
        Some((first, first + self.items.len() - 1))
    }
}

/// Clamp `requested` into `1..=last` and slice that page.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, requested: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);
    let number = requested.clamp(1, total_pages.max(1));
    let start = ((number - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        number,
        page_size,
        total_pages,
        total_items,
    }
}

/// View state of the all-blogs page.
#[derive(Debug, Clone)]
pub struct BlogListing {
    entries: Vec<BlogEntry>,
    filtered: Vec<BlogEntry>,
    search: String,
    sort: SortKey,
    page: usize,
    page_size: usize,
    loading: bool,
    error: Option<String>,
}

impl Default for BlogListing {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl BlogListing {
    pub fn new(page_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            filtered: Vec::new(),
            search: String::new(),
            sort: SortKey::default(),
            page: 1,
            page_size: page_size.max(1),
            loading: true,
            error: None,
        }
    }

    /// Replace the fetched set; returns to page 1.
    pub fn set_entries(&mut self, entries: Vec<BlogEntry>) {
        self.entries = entries;
        self.loading = false;
        self.error = None;
        self.recompute();
    }

    /// Change the search term; returns to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.recompute();
    }

    /// Change the sort key; returns to page 1.
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = key;
        self.recompute();
    }

    /// Jump to a page, clamped to the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Every entry matching the search, in sort order.
    pub fn visible(&self) -> &[BlogEntry] {
        &self.filtered
    }

    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size)
    }

    pub fn current_page(&self) -> Page<BlogEntry> {
        paginate(&self.filtered, self.page_size, self.page)
    }

    /// Fetch the curated set. On failure the list is emptied and the error
    /// kept for display.
    pub async fn reload(&mut self, catalog: &BlogCatalog) -> Result<(), DomainError> {
        match catalog.curated().await {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Curated listing fetched");
                self.set_entries(entries);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch curated listing");
                self.entries.clear();
                self.loading = false;
                self.error = Some(e.to_string());
                self.recompute();
                Err(e)
            }
        }
    }

    /// Wait for the next change on `subscription`, then reload.
    ///
    /// Returns `false` once the feed has closed.
    pub async fn follow(&mut self, catalog: &BlogCatalog, subscription: &mut Subscription) -> bool {
        if subscription.next_event().await.is_none() {
            return false;
        }
        // Reload errors are kept in `error`; the stream continues.
        let _ = self.reload(catalog).await;
        true
    }

    fn recompute(&mut self) {
        let mut filtered: Vec<BlogEntry> = self
            .entries
            .iter()
            .filter(|entry| matches_search(entry, &self.search))
            .cloned()
            .collect();
        sort_entries(&mut filtered, self.sort);
        self.filtered = filtered;
        self.page = 1;
    }
}
