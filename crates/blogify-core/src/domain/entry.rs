use serde::{Deserialize, Serialize};

use super::{Post, Profile};

/// A post joined with its author profile - the unit every listing returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogEntry {
    pub post: Post,
    pub author: Profile,
}

impl BlogEntry {
    pub fn new(post: Post, author: Profile) -> Self {
        Self { post, author }
    }

    pub fn author_name(&self) -> &str {
        self.author.display_name()
    }
}
