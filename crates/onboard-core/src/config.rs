//! Configuration management utilities
//!
//! The dashboard is configured from an optional YAML file. Every field has a
//! default, so an empty document is a valid configuration; command-line flags
//! and environment variables are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

use crate::{
    mask_sensitive, ServiceError, ServiceResult, DEFAULT_ONBOARDING_STAGES,
    DEFAULT_USER_KEY_PATTERN,
};

// Helper functions for serde defaults
fn default_key_pattern() -> String {
    DEFAULT_USER_KEY_PATTERN.to_string()
}

fn default_scan_count() -> usize {
    100
}

fn default_max_scan_iterations() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_stage_order() -> Vec<String> {
    DEFAULT_ONBOARDING_STAGES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_stage_fields() -> Vec<String> {
    vec![
        "onboarding_stage".to_string(),
        "stage".to_string(),
        "current_stage".to_string(),
        "onboardingStage".to_string(),
    ]
}

fn default_agreement_fields() -> Vec<String> {
    vec!["agreement_accepted".to_string()]
}

fn default_expiry_fields() -> Vec<String> {
    vec!["subscription_expiry".to_string()]
}

fn default_created_fields() -> Vec<String> {
    vec!["created_at".to_string()]
}

fn default_blocked_fields() -> Vec<String> {
    vec!["bot_was_blocked".to_string()]
}

/// Key-value store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvConfig {
    /// Connection URL, e.g. `rediss://default:<password>@<host>:<port>`
    #[serde(default)]
    pub url: Option<String>,

    /// Key pattern passed to `SCAN ... MATCH`
    #[serde(default = "default_key_pattern")]
    pub key_pattern: String,

    /// `COUNT` hint for each `SCAN` call
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,

    /// Upper bound on `SCAN` round trips per load
    #[serde(default = "default_max_scan_iterations")]
    pub max_scan_iterations: usize,

    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub response_timeout_secs: u64,

    /// Verify the server certificate on TLS connections
    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            url: None,
            key_pattern: default_key_pattern(),
            scan_count: default_scan_count(),
            max_scan_iterations: default_max_scan_iterations(),
            connect_timeout_secs: default_timeout_secs(),
            response_timeout_secs: default_timeout_secs(),
            verify_tls: false,
        }
    }
}

impl KvConfig {
    /// URL with the password masked, safe for logs.
    ///
    /// A URL that does not parse is replaced entirely, since its credentials
    /// cannot be located reliably.
    pub fn redacted_url(&self) -> Option<String> {
        let raw = self.url.as_deref()?;
        let Ok(mut url) = Url::parse(raw) else {
            return Some("<unparseable url>".to_string());
        };

        if let Some(password) = url.password().map(mask_sensitive) {
            url.set_password(Some(&password)).ok()?;
        } else if !url.username().is_empty() {
            // A lone userinfo component is usually a token
            let masked = mask_sensitive(url.username());
            url.set_username(&masked).ok()?;
        }
        Some(url.to_string())
    }
}

/// Candidate field names for each profile attribute, tried in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default = "default_stage_fields")]
    pub stage: Vec<String>,

    #[serde(default = "default_agreement_fields")]
    pub agreement_accepted: Vec<String>,

    #[serde(default = "default_expiry_fields")]
    pub subscription_expiry: Vec<String>,

    #[serde(default = "default_created_fields")]
    pub created_at: Vec<String>,

    #[serde(default = "default_blocked_fields")]
    pub bot_was_blocked: Vec<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            stage: default_stage_fields(),
            agreement_accepted: default_agreement_fields(),
            subscription_expiry: default_expiry_fields(),
            created_at: default_created_fields(),
            bot_was_blocked: default_blocked_fields(),
        }
    }
}

/// Top-level dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub kv: KvConfig,

    /// Funnel progression, first stage to last
    #[serde(default = "default_stage_order")]
    pub stage_order: Vec<String>,

    #[serde(default)]
    pub fields: FieldMapping,

    /// Use the bundled sample users when the store has none
    #[serde(default = "default_true")]
    pub demo_fallback: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            kv: KvConfig::default(),
            stage_order: default_stage_order(),
            fields: FieldMapping::default(),
            demo_fallback: true,
        }
    }
}

impl DashboardConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Read and validate a YAML configuration file
    pub fn load(path: &Path) -> ServiceResult<Self> {
        debug!("Loading configuration from {}", path.display());

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that can never produce a result
    pub fn validate(&self) -> ServiceResult<()> {
        if self.kv.scan_count == 0 {
            return Err(ServiceError::configuration("kv.scan_count must be at least 1"));
        }
        if self.kv.max_scan_iterations == 0 {
            return Err(ServiceError::configuration(
                "kv.max_scan_iterations must be at least 1",
            ));
        }
        if self.kv.key_pattern.trim().is_empty() {
            return Err(ServiceError::configuration("kv.key_pattern must not be empty"));
        }
        if self.stage_order.is_empty() {
            return Err(ServiceError::configuration("stage_order must not be empty"));
        }
        if self.fields.stage.is_empty() {
            return Err(ServiceError::configuration(
                "fields.stage must list at least one field name",
            ));
        }
        Ok(())
    }
}
