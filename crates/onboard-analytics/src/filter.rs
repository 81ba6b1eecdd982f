//! Profile filters applied before the timeline is built

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{normalize_stage, UserProfile};
use onboard_core::{ServiceError, UtcDateTime};

/// Filter on subscription state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityFilter {
    #[default]
    All,
    /// Subscription expires after now
    Active,
    /// Subscription expired at or before now
    Inactive,
}

impl ActivityFilter {
    /// Users with no known expiry match neither `Active` nor `Inactive`
    pub fn matches(&self, profile: &UserProfile, now: UtcDateTime) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::Active => profile.subscription_expiry.map_or(false, |e| e > now),
            ActivityFilter::Inactive => profile.subscription_expiry.map_or(false, |e| e <= now),
        }
    }
}

impl fmt::Display for ActivityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityFilter::All => write!(f, "all"),
            ActivityFilter::Active => write!(f, "active"),
            ActivityFilter::Inactive => write!(f, "inactive"),
        }
    }
}

impl FromStr for ActivityFilter {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ActivityFilter::All),
            "active" => Ok(ActivityFilter::Active),
            "inactive" => Ok(ActivityFilter::Inactive),
            other => Err(ServiceError::validation(format!(
                "unknown activity filter '{}', expected all, active or inactive",
                other
            ))),
        }
    }
}

/// Stage and activity filter over a set of profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFilter {
    /// Keep only these stages; empty keeps every stage. Compared after
    /// [`normalize_stage`], so `Complete` matches users stored at `complete`.
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub activity: ActivityFilter,
}

impl ProfileFilter {
    pub fn matches(&self, profile: &UserProfile, now: UtcDateTime) -> bool {
        let stage_ok = self.stages.is_empty()
            || profile
                .stage()
                .map_or(false, |stage| self.stages.iter().any(|s| normalize_stage(s) == stage));

        stage_ok && self.activity.matches(profile, now)
    }

    pub fn apply<'a>(&self, profiles: &'a [UserProfile], now: UtcDateTime) -> Vec<&'a UserProfile> {
        profiles.iter().filter(|p| self.matches(p, now)).collect()
    }
}
