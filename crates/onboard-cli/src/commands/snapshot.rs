use chrono::Utc;
use clap::Args;
use onboard_analytics::{ActivityFilter, ProfileFilter, SnapshotRequest, TimeUnit};
use onboard_funnels::CountingPolicy;

use crate::context::GlobalArgs;
use crate::output::print_json;

#[derive(Args)]
pub struct SnapshotCommand {
    #[arg(long, default_value = "cumulative-backward")]
    pub policy: CountingPolicy,

    #[arg(long, default_value = "day")]
    pub unit: TimeUnit,

    /// Narrow the timeline to these stages (repeatable)
    #[arg(long = "stage")]
    pub stages: Vec<String>,

    #[arg(long, default_value = "all")]
    pub activity: ActivityFilter,
}

impl SnapshotCommand {
    pub fn execute(self, global: &GlobalArgs) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        let service = rt.block_on(global.build_service())?;
        let loaded = rt.block_on(service.load_profiles())?;

        let request = SnapshotRequest {
            policy: self.policy,
            time_unit: self.unit,
            filter: ProfileFilter {
                stages: self.stages,
                activity: self.activity,
            },
        };

        print_json(&service.snapshot(&loaded, &request, Utc::now()))
    }
}
