use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    build_timeline, normalize_stage, normalize_users, stage_distribution, ActivityStats, DashboardSummary,
    ProfileFilter, StageCount, TimeUnit, TimelinePoint, UserProfile,
};
use onboard_core::{DashboardConfig, ServiceResult, UserSource, UtcDateTime};
use onboard_funnels::{CountingPolicy, FunnelAggregator, FunnelOutcome, FunnelReport, StageOrder};

/// Profiles from one load, with where they came from
#[derive(Debug, Clone)]
pub struct LoadedProfiles {
    pub source: &'static str,
    /// The primary source was empty and the fallback was used instead
    pub used_fallback: bool,
    pub profiles: Vec<UserProfile>,
}

impl LoadedProfiles {
    /// Users the source failed to read
    pub fn load_errors(&self) -> usize {
        self.profiles
            .iter()
            .filter(|p| p.load_error.is_some())
            .count()
    }
}

/// What the snapshot should show
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotRequest {
    #[serde(default)]
    pub policy: CountingPolicy,
    #[serde(default)]
    pub time_unit: TimeUnit,
    /// Applied to the timeline only
    #[serde(default)]
    pub filter: ProfileFilter,
}

/// Everything the dashboard renders, computed from one set of profiles
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: UtcDateTime,
    pub source: String,
    pub used_fallback: bool,
    pub load_errors: usize,
    pub summary: DashboardSummary,
    pub funnel: FunnelReport,
    pub stage_distribution: Vec<StageCount>,
    pub activity: ActivityStats,
    pub time_unit: TimeUnit,
    pub filter: ProfileFilter,
    pub filtered_users: usize,
    pub timeline: Vec<TimelinePoint>,
}

/// Loads users from an injected source and derives the dashboard views
pub struct DashboardService {
    source: Arc<dyn UserSource>,
    fallback: Option<Arc<dyn UserSource>>,
    config: DashboardConfig,
    aggregator: FunnelAggregator,
}

impl DashboardService {
    /// Fails when the configured stage order is empty or repeats a stage.
    /// Labels are normalised the same way as stored stages.
    pub fn new(source: Arc<dyn UserSource>, config: DashboardConfig) -> ServiceResult<Self> {
        let order = StageOrder::new(config.stage_order.iter().map(|s| normalize_stage(s)))?;
        Ok(Self {
            source,
            fallback: None,
            config,
            aggregator: FunnelAggregator::new(order),
        })
    }

    /// Source to read from when the primary one returns no users.
    /// Only consulted when `demo_fallback` is enabled in the configuration.
    pub fn with_fallback(mut self, fallback: Arc<dyn UserSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn stage_order(&self) -> &StageOrder {
        self.aggregator.stage_order()
    }

    pub async fn load_profiles(&self) -> ServiceResult<LoadedProfiles> {
        debug!("Loading users from {} source", self.source.source_type());
        let raw = self.source.fetch_users().await?;

        if raw.is_empty() && self.config.demo_fallback {
            if let Some(fallback) = &self.fallback {
                warn!(
                    "No users found in {} source, using {} fallback",
                    self.source.source_type(),
                    fallback.source_type()
                );
                let raw = fallback.fetch_users().await?;
                return Ok(LoadedProfiles {
                    source: fallback.source_type(),
                    used_fallback: true,
                    profiles: normalize_users(&raw, &self.config.fields),
                });
            }
        }

        let loaded = LoadedProfiles {
            source: self.source.source_type(),
            used_fallback: false,
            profiles: normalize_users(&raw, &self.config.fields),
        };

        let errors = loaded.load_errors();
        if errors > 0 {
            warn!("{} of {} users could not be read", errors, loaded.profiles.len());
        }
        info!("Loaded {} users", loaded.profiles.len());
        Ok(loaded)
    }

    pub fn funnel(&self, profiles: &[UserProfile], policy: CountingPolicy) -> FunnelOutcome {
        let outcome = self
            .aggregator
            .aggregate(profiles.iter().map(|p| &p.record), policy);

        if outcome.diagnostics.unrecognized > 0 {
            warn!(
                "{} users are at a stage outside the funnel",
                outcome.diagnostics.unrecognized
            );
        }
        outcome
    }

    pub fn funnel_report(&self, profiles: &[UserProfile], policy: CountingPolicy) -> FunnelReport {
        FunnelReport::from_outcome(&self.funnel(profiles, policy))
    }

    pub fn summary(&self, profiles: &[UserProfile]) -> DashboardSummary {
        DashboardSummary::compute(profiles, self.stage_order().last())
    }

    /// Build every view. Metrics, funnel and breakdowns cover all profiles;
    /// the request's filter narrows the timeline.
    pub fn snapshot(
        &self,
        loaded: &LoadedProfiles,
        request: &SnapshotRequest,
        now: UtcDateTime,
    ) -> DashboardSnapshot {
        let profiles = &loaded.profiles;
        let filtered = request.filter.apply(profiles, now);

        DashboardSnapshot {
            generated_at: now,
            source: loaded.source.to_string(),
            used_fallback: loaded.used_fallback,
            load_errors: loaded.load_errors(),
            summary: self.summary(profiles),
            funnel: self.funnel_report(profiles, request.policy),
            stage_distribution: stage_distribution(profiles),
            activity: ActivityStats::compute(profiles, now),
            time_unit: request.time_unit,
            filter: request.filter.clone(),
            filtered_users: filtered.len(),
            timeline: build_timeline(filtered, request.time_unit),
        }
    }
}
