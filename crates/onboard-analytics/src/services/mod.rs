mod service;

pub use service::{DashboardService, DashboardSnapshot, LoadedProfiles, SnapshotRequest};
