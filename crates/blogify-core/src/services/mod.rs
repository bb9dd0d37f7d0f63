//! Services - the workflows built on top of the ports.

pub mod catalog;
pub mod listing;
pub mod verification;

#[cfg(test)]
pub(crate) mod fakes;

pub use catalog::{BlogCatalog, HomeFeed, LATEST_LIMIT, SiteStats};
pub use listing::{BlogListing, DEFAULT_PAGE_SIZE, Page, SortKey};
pub use verification::{DEFAULT_HISTORY_LIMIT, Notice, VerificationQueue, VerificationWorkflow};
