//! Dashboard analytics over onboarding user records
//!
//! Turns raw user hashes into typed profiles and derives everything the
//! dashboard shows: headline metrics, the onboarding funnel, per-stage and
//! activity breakdowns, and a registration timeline.

pub mod filter;
pub mod profile;
pub mod services;
pub mod summary;
pub mod timeline;

pub use filter::{ActivityFilter, ProfileFilter};
pub use profile::{normalize_stage, normalize_users, UserProfile};
pub use services::{DashboardService, DashboardSnapshot, LoadedProfiles, SnapshotRequest};
pub use summary::{stage_distribution, ActivityStats, DashboardSummary, StageCount};
pub use timeline::{build_timeline, TimeUnit, TimelinePoint};
