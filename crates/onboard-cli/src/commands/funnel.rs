use clap::Args;
use colored::Colorize;
use onboard_funnels::{CountingPolicy, FunnelReport};
use tracing::debug;

use crate::context::GlobalArgs;
use crate::output::{bar, print_header, print_json, print_notice};

#[derive(Args)]
pub struct FunnelCommand {
    /// Counting policy: stage-exact, cumulative-forward, cumulative-backward
    #[arg(long, default_value = "cumulative-backward")]
    pub policy: CountingPolicy,

    /// Show the funnel under every counting policy
    #[arg(long, conflicts_with = "policy")]
    pub all: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

fn print_report(report: &FunnelReport) {
    print_header(&format!("Onboarding funnel ({})", report.policy));

    println!(
        "{}",
        format!("{:>3}  {:<22} {:>7} {:>8} {:>8}", "#", "Stage", "Users", "Conv.", "Share").dimmed()
    );

    let max = report.steps.iter().map(|s| s.count).max().unwrap_or(0);
    for step in &report.steps {
        println!(
            "{:>3}  {:<22} {} {:>7.1}% {:>7.1}%  {}",
            step.order + 1,
            step.display_name,
            format!("{:>7}", step.count).bright_cyan(),
            step.conversion_rate,
            step.share_of_entries,
            bar(step.count, max).bright_green()
        );
    }

    println!();
    println!(
        "{} {:.1}% ({} of {})",
        "Overall conversion:".bright_white().bold(),
        report.overall_conversion_rate,
        report.final_count,
        report.total_entries
    );

    let d = &report.diagnostics;
    let skipped = d.unrecognized + d.missing_stage + d.duplicate_records + d.conflicting_duplicates;
    if skipped > 0 {
        print_notice(&format!(
            "Skipped: {} at unknown stages, {} without a stage; {} duplicate records, {} users seen at several stages",
            d.unrecognized, d.missing_stage, d.duplicate_records, d.conflicting_duplicates
        ));
    }
}

impl FunnelCommand {
    pub fn execute(self, global: &GlobalArgs) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        let service = rt.block_on(global.build_service())?;
        let loaded = rt.block_on(service.load_profiles())?;

        let policies: Vec<CountingPolicy> = if self.all {
            CountingPolicy::ALL.to_vec()
        } else {
            vec![self.policy]
        };
        debug!("Computing funnel for policies {:?}", policies);

        let reports: Vec<FunnelReport> = policies
            .into_iter()
            .map(|policy| service.funnel_report(&loaded.profiles, policy))
            .collect();

        if self.json {
            return if self.all {
                print_json(&reports)
            } else {
                print_json(&reports[0])
            };
        }

        if loaded.used_fallback {
            print_notice("No users found in the store; showing demo data.");
        }
        for report in &reports {
            print_report(report);
        }
        Ok(())
    }
}
