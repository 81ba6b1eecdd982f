//! Stage order and display names

use serde::Serialize;
use std::collections::HashMap;

use crate::FunnelError;
use onboard_core::DEFAULT_ONBOARDING_STAGES;

/// Human-readable names for the default onboarding stages
const STAGE_DISPLAY_NAMES: [(&str, &str); 10] = [
    ("agreement", "Agreement"),
    ("birth_date", "Birth date"),
    ("gender", "Gender"),
    ("goal", "Goal"),
    ("activity_level", "Activity level"),
    ("current_weight", "Current weight"),
    ("target_weight", "Target weight"),
    ("height", "Height"),
    ("daily_calories", "Daily calories"),
    ("complete", "Onboarding complete"),
];

/// Display name for a stage label, or the label itself when it has none
pub fn stage_display_name(stage: &str) -> &str {
    STAGE_DISPLAY_NAMES
        .iter()
        .find(|(key, _)| *key == stage)
        .map(|(_, name)| *name)
        .unwrap_or(stage)
}

/// A validated, duplicate-free progression of stages, first to last
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageOrder {
    labels: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl StageOrder {
    /// Build a stage order, rejecting empty orders, blank labels and repeats
    pub fn new<I, S>(labels: I) -> Result<Self, FunnelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        if labels.is_empty() {
            return Err(FunnelError::InvalidStageOrder {
                message: "stage order is empty".to_string(),
            });
        }

        let mut positions = HashMap::with_capacity(labels.len());
        for (position, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(FunnelError::InvalidStageOrder {
                    message: format!("stage at position {} is blank", position),
                });
            }
            if positions.insert(label.clone(), position).is_some() {
                return Err(FunnelError::InvalidStageOrder {
                    message: format!("stage '{}' appears more than once", label),
                });
            }
        }

        Ok(Self { labels, positions })
    }

    /// The ten-step onboarding flow, from `agreement` to `complete`
    pub fn onboarding() -> Self {
        let labels: Vec<String> = DEFAULT_ONBOARDING_STAGES
            .iter()
            .map(|s| s.to_string())
            .collect();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(position, label)| (label.clone(), position))
            .collect();
        Self { labels, positions }
    }

    pub fn index_of(&self, stage: &str) -> Option<usize> {
        self.positions.get(stage).copied()
    }

    pub fn contains(&self, stage: &str) -> bool {
        self.positions.contains_key(stage)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: `new` rejects an empty order
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn first(&self) -> &str {
        &self.labels[0]
    }

    pub fn last(&self) -> &str {
        &self.labels[self.labels.len() - 1]
    }
}

impl Default for StageOrder {
    fn default() -> Self {
        Self::onboarding()
    }
}
