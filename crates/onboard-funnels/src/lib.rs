//! Funnels analytics module
//!
//! Computes per-stage user counts for the onboarding funnel under a selectable
//! counting policy, and derives conversion metrics from the result.

pub mod aggregator;
pub mod error;
pub mod report;
pub mod stages;
pub mod types;

pub use aggregator::{compute_funnel, FunnelAggregator};
pub use error::FunnelError;
pub use report::{FunnelReport, StepConversion};
pub use stages::{stage_display_name, StageOrder};
pub use types::{CountingPolicy, FunnelDiagnostics, FunnelOutcome, FunnelRow, UserRecord};
