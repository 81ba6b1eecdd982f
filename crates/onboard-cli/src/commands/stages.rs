use clap::Args;
use colored::Colorize;
use onboard_analytics::stage_distribution;

use crate::context::GlobalArgs;
use crate::output::{bar, print_header, print_json};

#[derive(Args)]
pub struct StagesCommand {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl StagesCommand {
    pub fn execute(self, global: &GlobalArgs) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        let service = rt.block_on(global.build_service())?;
        let loaded = rt.block_on(service.load_profiles())?;

        let distribution = stage_distribution(&loaded.profiles);
        if self.json {
            return print_json(&distribution);
        }

        print_header("Users by onboarding stage");
        let max = distribution.first().map(|c| c.count).unwrap_or(0);
        for entry in &distribution {
            let known = service.stage_order().contains(&entry.stage);
            let name = format!("{:<24}", entry.display_name);
            let name = if known { name.normal() } else { name.yellow() };
            println!(
                "{} {}  {}",
                name,
                format!("{:>7}", entry.count).bright_cyan(),
                bar(entry.count, max).bright_green()
            );
        }
        Ok(())
    }
}
