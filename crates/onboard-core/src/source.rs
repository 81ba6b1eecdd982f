//! Data-access interface for user records
//!
//! Analytics never talks to a store directly. A [`UserSource`] is handed to
//! the dashboard service and yields the raw field maps of every user, which
//! are then normalised by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ServiceResult;

/// A user as stored: the store key plus its untyped fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    /// Store key, also used as the user identifier (e.g. `user:42`)
    pub key: String,
    /// Field/value pairs of the user hash, empty for non-hash keys
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Set when the record could not be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RawUser {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to attach a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn failed(key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: BTreeMap::new(),
            error: Some(error.into()),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Trait implemented by every backing store that can list users
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Short identifier of the backend, used in logs
    fn source_type(&self) -> &'static str;

    /// Fetch a snapshot of all users
    async fn fetch_users(&self) -> ServiceResult<Vec<RawUser>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_user_builder() {
        let user = RawUser::new("user:1")
            .with_field("onboarding_stage", "goal")
            .with_field("bot_was_blocked", "False");

        assert_eq!(user.key, "user:1");
        assert_eq!(user.field("onboarding_stage"), Some("goal"));
        assert_eq!(user.field("missing"), None);
        assert!(user.error.is_none());
    }

    #[test]
    fn test_failed_user_keeps_key() {
        let user = RawUser::failed("user:9", "WRONGTYPE");
        assert_eq!(user.key, "user:9");
        assert!(user.fields.is_empty());
        assert_eq!(user.error.as_deref(), Some("WRONGTYPE"));
    }
}
