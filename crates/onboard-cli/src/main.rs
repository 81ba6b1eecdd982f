//! Onboard CLI - onboarding analytics from the command line
//!
//! Loads user records from Redis (or the bundled demo data) and prints the
//! onboarding funnel, headline metrics, stage breakdown and timeline.

mod commands;
mod context;
mod output;

use clap::{Parser, Subcommand};
use commands::{FunnelCommand, SnapshotCommand, StagesCommand, SummaryCommand, TimelineCommand};
use context::GlobalArgs;
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "ONBOARD_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "ONBOARD_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-stage onboarding funnel
    Funnel(FunnelCommand),
    /// Headline metrics and activity statistics
    Summary(SummaryCommand),
    /// Users per recorded stage
    Stages(StagesCommand),
    /// Users per day, week or month of agreement
    Timeline(TimelineCommand),
    /// Every view at once, as JSON
    Snapshot(SnapshotCommand),
}

fn init_tracing(log_level: &str, log_format: &str) -> anyhow::Result<()> {
    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG environment variable: {}", e))?
    } else {
        tracing_subscriber::EnvFilter::try_new(format!(
            "onboard_cli={level},\
             onboard_core={level},\
             onboard_funnels={level},\
             onboard_kv={level},\
             onboard_analytics={level},\
             redis=warn,\
             rustls=warn",
            level = log_level
        ))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", log_level, e))?
    };

    let fmt_layer = match log_format {
        "full" => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .with_writer(std::io::stderr)
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, &cli.log_format)?;

    match cli.command {
        Commands::Funnel(cmd) => cmd.execute(&cli.global),
        Commands::Summary(cmd) => cmd.execute(&cli.global),
        Commands::Stages(cmd) => cmd.execute(&cli.global),
        Commands::Timeline(cmd) => cmd.execute(&cli.global),
        Commands::Snapshot(cmd) => cmd.execute(&cli.global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use onboard_analytics::{ActivityFilter, TimeUnit};
    use onboard_funnels::CountingPolicy;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_funnel_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["onboard", "funnel", "--policy", "stage-exact", "--demo"])
            .unwrap();
        assert!(cli.global.demo);
        match cli.command {
            Commands::Funnel(cmd) => {
                assert_eq!(cmd.policy, CountingPolicy::StageExact);
                assert!(!cmd.all);
            }
            _ => panic!("expected funnel command"),
        }
    }

    #[test]
    fn test_parse_timeline_filters() {
        let cli = Cli::try_parse_from([
            "onboard", "timeline", "--unit", "week", "--stage", "complete", "--stage", "goal",
            "--activity", "active",
        ])
        .unwrap();
        match cli.command {
            Commands::Timeline(cmd) => {
                assert_eq!(cmd.unit, TimeUnit::Week);
                assert_eq!(cmd.activity, ActivityFilter::Active);
                let filter = cmd.filter();
                assert_eq!(filter.stages, vec!["complete", "goal"]);
            }
            _ => panic!("expected timeline command"),
        }
    }

    #[test]
    fn test_funnel_defaults_to_backward_policy() {
        let cli = Cli::try_parse_from(["onboard", "funnel"]).unwrap();
        match cli.command {
            Commands::Funnel(cmd) => assert_eq!(cmd.policy, CountingPolicy::CumulativeBackward),
            _ => panic!("expected funnel command"),
        }
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["onboard", "funnel", "--policy", "sideways"]).is_err());
    }
}
