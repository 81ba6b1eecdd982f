use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::FunnelError;

/// A user as seen by the funnel: an identifier and the stage it reached
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub stage: Option<String>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage: Some(stage.into()),
        }
    }

    /// A record with no stage recorded
    pub fn without_stage(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage: None,
        }
    }
}

/// How many stages a single user counts toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountingPolicy {
    /// Only the stage the user is recorded at
    StageExact,
    /// The user's stage and every earlier one: "reached at least this stage"
    CumulativeForward,
    /// The user's stage and every later one: "has not gone past this stage"
    #[default]
    CumulativeBackward,
}

impl CountingPolicy {
    pub const ALL: [CountingPolicy; 3] = [
        CountingPolicy::StageExact,
        CountingPolicy::CumulativeForward,
        CountingPolicy::CumulativeBackward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CountingPolicy::StageExact => "stage-exact",
            CountingPolicy::CumulativeForward => "cumulative-forward",
            CountingPolicy::CumulativeBackward => "cumulative-backward",
        }
    }
}

impl fmt::Display for CountingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountingPolicy {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "stage-exact" | "exact" => Ok(CountingPolicy::StageExact),
            "cumulative-forward" | "forward" => Ok(CountingPolicy::CumulativeForward),
            "cumulative-backward" | "backward" => Ok(CountingPolicy::CumulativeBackward),
            _ => Err(FunnelError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Count for one stage of the funnel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelRow {
    pub stage: String,
    pub count: u64,
    /// Zero-based position in the stage order
    pub order: usize,
}

/// What happened to the input records during aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelDiagnostics {
    /// Records handed to the aggregator
    pub total_records: u64,
    /// Distinct identifiers counted at a known stage
    pub recognized: u64,
    /// Records whose stage is not part of the stage order
    pub unrecognized: u64,
    /// Records with no stage, or a blank one
    pub missing_stage: u64,
    /// Repeats of an identifier already seen at the same stage
    pub duplicate_records: u64,
    /// Identifiers seen at more than one known stage
    pub conflicting_duplicates: u64,
}

/// Full result of one aggregation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelOutcome {
    pub policy: CountingPolicy,
    pub rows: Vec<FunnelRow>,
    pub diagnostics: FunnelDiagnostics,
}

impl FunnelOutcome {
    /// Counts in stage order
    pub fn counts(&self) -> Vec<u64> {
        self.rows.iter().map(|row| row.count).collect()
    }

    pub fn count_for(&self, stage: &str) -> Option<u64> {
        self.rows
            .iter()
            .find(|row| row.stage == stage)
            .map(|row| row.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse_variants() {
        let cases = vec![
            ("stage-exact", CountingPolicy::StageExact),
            ("stage_exact", CountingPolicy::StageExact),
            ("Exact", CountingPolicy::StageExact),
            ("cumulative-forward", CountingPolicy::CumulativeForward),
            ("CUMULATIVE_FORWARD", CountingPolicy::CumulativeForward),
            ("backward", CountingPolicy::CumulativeBackward),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<CountingPolicy>().unwrap(), expected, "Failed for {}", input);
        }
    }

    #[test]
    fn test_default_policy_is_backward() {
        assert_eq!(CountingPolicy::default(), CountingPolicy::CumulativeBackward);
    }

    #[test]
    fn test_policy_parse_unknown() {
        let err = "sideways".parse::<CountingPolicy>().unwrap_err();
        assert_eq!(err, FunnelError::UnknownPolicy("sideways".to_string()));
    }

    #[test]
    fn test_policy_display_matches_serde() {
        for policy in CountingPolicy::ALL {
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{}\"", policy));
            assert_eq!(policy.to_string().parse::<CountingPolicy>().unwrap(), policy);
        }
    }
}
