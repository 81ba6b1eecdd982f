use chrono::Utc;
use clap::Args;
use onboard_analytics::{ActivityStats, DashboardSummary};
use serde::Serialize;

use crate::context::GlobalArgs;
use crate::output::{print_header, print_json, print_metric, print_notice};

#[derive(Args)]
pub struct SummaryCommand {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SummaryOutput {
    summary: DashboardSummary,
    activity: ActivityStats,
    load_errors: usize,
}

impl SummaryCommand {
    pub fn execute(self, global: &GlobalArgs) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        let service = rt.block_on(global.build_service())?;
        let loaded = rt.block_on(service.load_profiles())?;

        let output = SummaryOutput {
            summary: service.summary(&loaded.profiles),
            activity: ActivityStats::compute(&loaded.profiles, Utc::now()),
            load_errors: loaded.load_errors(),
        };

        if self.json {
            return print_json(&output);
        }

        if loaded.used_fallback {
            print_notice("No users found in the store; showing demo data.");
        }

        print_header("Key metrics");
        print_metric("Users", output.summary.total_users);
        print_metric("Completed onboarding", output.summary.completed_onboarding);
        print_metric("Blocked the bot", output.summary.blocked_users);

        print_header("Activity");
        print_metric("Active subscriptions", output.activity.active);
        print_metric("Inactive", output.activity.inactive);

        if output.load_errors > 0 {
            print_notice(&format!("{} users could not be read", output.load_errors));
        }
        Ok(())
    }
}
