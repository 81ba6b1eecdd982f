use chrono::Utc;
use clap::Args;
use colored::Colorize;
use onboard_analytics::{build_timeline, ActivityFilter, ProfileFilter, TimeUnit};

use crate::context::GlobalArgs;
use crate::output::{bar, print_header, print_json, print_notice};

#[derive(Args)]
pub struct TimelineCommand {
    /// Bucket size: day, week, month
    #[arg(long, default_value = "day")]
    pub unit: TimeUnit,

    /// Only include users at these stages (repeatable)
    #[arg(long = "stage")]
    pub stages: Vec<String>,

    /// Subscription state: all, active, inactive
    #[arg(long, default_value = "all")]
    pub activity: ActivityFilter,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl TimelineCommand {
    pub fn filter(&self) -> ProfileFilter {
        ProfileFilter {
            stages: self.stages.clone(),
            activity: self.activity,
        }
    }

    pub fn execute(self, global: &GlobalArgs) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        let service = rt.block_on(global.build_service())?;
        let loaded = rt.block_on(service.load_profiles())?;

        let filtered = self.filter().apply(&loaded.profiles, Utc::now());
        let timeline = build_timeline(filtered, self.unit);

        if self.json {
            return print_json(&timeline);
        }

        print_header(&format!("Users per {} of agreement", self.unit));
        if timeline.is_empty() {
            print_notice("No users with an agreement date match the filter.");
            return Ok(());
        }

        let max = timeline.iter().map(|p| p.user_count).max().unwrap_or(0);
        for point in &timeline {
            println!(
                "{}  {}  {}",
                point.period_start,
                format!("{:>7}", point.user_count).bright_cyan(),
                bar(point.user_count, max).bright_green()
            );
        }
        Ok(())
    }
}
