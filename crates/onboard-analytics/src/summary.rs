//! Headline metrics and breakdowns

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::UserProfile;
use onboard_core::UtcDateTime;
use onboard_funnels::stage_display_name;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_users: u64,
    /// Users at the final stage of the funnel
    pub completed_onboarding: u64,
    pub blocked_users: u64,
}

impl DashboardSummary {
    pub fn compute<'a, I>(profiles: I, completion_stage: &str) -> Self
    where
        I: IntoIterator<Item = &'a UserProfile>,
    {
        profiles
            .into_iter()
            .fold(Self::default(), |mut summary, profile| {
                summary.total_users += 1;
                if profile.stage() == Some(completion_stage) {
                    summary.completed_onboarding += 1;
                }
                if profile.bot_was_blocked {
                    summary.blocked_users += 1;
                }
                summary
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub display_name: String,
    pub count: u64,
}

/// Users per recorded stage, most common first.
///
/// Every label is listed, including ones outside the funnel's stage order;
/// users without a stage are left out. Ties are broken by label.
pub fn stage_distribution<'a, I>(profiles: I) -> Vec<StageCount>
where
    I: IntoIterator<Item = &'a UserProfile>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for stage in profiles.into_iter().filter_map(UserProfile::stage) {
        *counts.entry(stage).or_insert(0) += 1;
    }

    let mut distribution: Vec<StageCount> = counts
        .into_iter()
        .map(|(stage, count)| StageCount {
            stage: stage.to_string(),
            display_name: stage_display_name(stage).to_string(),
            count,
        })
        .collect();

    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.stage.cmp(&b.stage)));
    distribution
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub active: u64,
    /// Everyone not active, including users with no known expiry
    pub inactive: u64,
}

impl ActivityStats {
    pub fn compute<'a, I>(profiles: I, now: UtcDateTime) -> Self
    where
        I: IntoIterator<Item = &'a UserProfile>,
    {
        let (active, total) = profiles
            .into_iter()
            .fold((0u64, 0u64), |(active, total), profile| {
                (active + u64::from(profile.is_active(now)), total + 1)
            });

        Self {
            active,
            inactive: total - active,
        }
    }
}
