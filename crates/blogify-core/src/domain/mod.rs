//! Domain entities - the core business objects.

mod entry;
mod post;
mod profile;

pub use entry::BlogEntry;
pub use post::{Post, VerificationState};
pub use profile::Profile;
