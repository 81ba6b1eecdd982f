//! Normalisation of raw user hashes into typed profiles

use serde::{Deserialize, Serialize};

use onboard_core::{parse_datetime, parse_truthy, FieldMapping, RawUser, UtcDateTime};
use onboard_funnels::UserRecord;

/// A user with the fields the dashboard understands, parsed and typed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub record: UserRecord,
    pub agreement_accepted: Option<UtcDateTime>,
    pub subscription_expiry: Option<UtcDateTime>,
    pub created_at: Option<UtcDateTime>,
    pub bot_was_blocked: bool,
    /// Error reported by the source while reading this user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

/// Canonical form of a stage label: trimmed and lowercased.
///
/// Applied to stored stages, the configured stage order and stage filters so
/// they compare equal regardless of how each was written.
pub fn normalize_stage(label: &str) -> String {
    label.trim().to_lowercase()
}

/// First candidate field that is present and non-blank
fn first_field<'a>(raw: &'a RawUser, candidates: &[String]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|name| raw.field(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

impl UserProfile {
    pub fn from_raw(raw: &RawUser, fields: &FieldMapping) -> Self {
        let stage = first_field(raw, &fields.stage).map(normalize_stage);

        Self {
            record: UserRecord {
                id: raw.key.clone(),
                stage,
            },
            agreement_accepted: first_field(raw, &fields.agreement_accepted)
                .and_then(parse_datetime),
            subscription_expiry: first_field(raw, &fields.subscription_expiry)
                .and_then(parse_datetime),
            created_at: first_field(raw, &fields.created_at).and_then(parse_datetime),
            bot_was_blocked: first_field(raw, &fields.bot_was_blocked)
                .map_or(false, parse_truthy),
            load_error: raw.error.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn stage(&self) -> Option<&str> {
        self.record.stage.as_deref()
    }

    /// Subscription still running at `now`; unknown expiry counts as inactive
    pub fn is_active(&self, now: UtcDateTime) -> bool {
        self.subscription_expiry.map_or(false, |expiry| expiry > now)
    }
}

/// Normalise every raw user with the same field mapping
pub fn normalize_users(raw: &[RawUser], fields: &FieldMapping) -> Vec<UserProfile> {
    raw.iter()
        .map(|user| UserProfile::from_raw(user, fields))
        .collect()
}
