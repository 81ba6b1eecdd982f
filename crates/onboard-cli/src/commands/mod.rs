pub mod funnel;
pub mod snapshot;
pub mod stages;
pub mod summary;
pub mod timeline;

pub use funnel::FunnelCommand;
pub use snapshot::SnapshotCommand;
pub use stages::StagesCommand;
pub use summary::SummaryCommand;
pub use timeline::TimelineCommand;
