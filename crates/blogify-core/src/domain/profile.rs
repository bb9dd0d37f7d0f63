use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile entity - the public face of an identity-provider user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Session subject issued by the identity provider.
    pub user_id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            display_name: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Stand-in for a post whose author row is missing.
    pub fn placeholder(user_id: Uuid) -> Self {
        Self::new(user_id, "unknown")
    }

    /// `display_name`, falling back to `username` when absent or blank.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let profile = Profile::new(Uuid::new_v4(), "ada");
        assert_eq!(profile.display_name(), "ada");

        let profile = profile.with_display_name("Ada Lovelace");
        assert_eq!(profile.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_blank_display_name_falls_back() {
        let profile = Profile::new(Uuid::new_v4(), "ada").with_display_name("  ");
        assert_eq!(profile.display_name(), "ada");
    }
}
