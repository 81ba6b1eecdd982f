//! Shared setup for every command: configuration and the dashboard service

use anyhow::Context;
use clap::Args;
use onboard_analytics::DashboardService;
use onboard_core::{DashboardConfig, UserSource};
use onboard_kv::{InMemoryUserSource, RedisUserSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// YAML configuration file
    #[arg(long, env = "ONBOARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Redis connection URL, e.g. rediss://default:<password>@<host>:<port>
    #[arg(long, env = "REDIS_URL", global = true, hide_env_values = true)]
    pub redis_url: Option<String>,

    /// Use the bundled demo users instead of connecting to Redis
    #[arg(long, global = true)]
    pub demo: bool,
}

impl GlobalArgs {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn load_config(&self) -> anyhow::Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => DashboardConfig::default(),
        };

        if let Some(url) = &self.redis_url {
            config.kv.url = Some(url.clone());
        }

        config.validate()?;
        debug!(
            "Using key pattern '{}' against {}",
            config.kv.key_pattern,
            config.kv.redacted_url().unwrap_or_else(|| "<no url>".to_string())
        );
        Ok(config)
    }

    /// Connect to the configured source and wire up the dashboard service
    pub async fn build_service(&self) -> anyhow::Result<DashboardService> {
        let config = self.load_config()?;

        let source: Arc<dyn UserSource> = if self.demo {
            info!("Using demo users");
            Arc::new(InMemoryUserSource::demo())
        } else if config.kv.url.is_some() {
            Arc::new(
                RedisUserSource::connect(&config.kv)
                    .await
                    .context("Failed to connect to Redis")?,
            )
        } else {
            anyhow::bail!(
                "No Redis URL configured. Pass --redis-url, set REDIS_URL, \
                 add kv.url to the configuration file, or use --demo"
            );
        };

        let service = DashboardService::new(source, config)?
            .with_fallback(Arc::new(InMemoryUserSource::demo()));
        Ok(service)
    }
}
