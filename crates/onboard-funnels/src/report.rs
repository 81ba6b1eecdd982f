//! Conversion metrics derived from a funnel outcome

use serde::{Deserialize, Serialize};

use crate::{stage_display_name, CountingPolicy, FunnelDiagnostics, FunnelOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConversion {
    pub stage: String,
    pub display_name: String,
    pub order: usize,
    pub count: u64,
    pub conversion_rate: f64, // Percentage of the previous stage's count
    pub drop_off_rate: f64,
    pub share_of_entries: f64, // Percentage of the first stage's count
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelReport {
    pub policy: CountingPolicy,
    pub total_entries: u64,
    pub final_count: u64,
    pub overall_conversion_rate: f64,
    pub steps: Vec<StepConversion>,
    pub diagnostics: FunnelDiagnostics,
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

impl FunnelReport {
    pub fn from_outcome(outcome: &FunnelOutcome) -> Self {
        let total_entries = outcome.rows.first().map(|row| row.count).unwrap_or(0);
        let final_count = outcome.rows.last().map(|row| row.count).unwrap_or(0);

        let mut steps = Vec::with_capacity(outcome.rows.len());
        let mut previous: Option<u64> = None;

        for row in &outcome.rows {
            let conversion_rate = match previous {
                None => 100.0,
                Some(previous_count) => percentage(row.count, previous_count),
            };

            steps.push(StepConversion {
                stage: row.stage.clone(),
                display_name: stage_display_name(&row.stage).to_string(),
                order: row.order,
                count: row.count,
                conversion_rate,
                drop_off_rate: (100.0 - conversion_rate).max(0.0),
                share_of_entries: percentage(row.count, total_entries),
            });

            previous = Some(row.count);
        }

        Self {
            policy: outcome.policy,
            total_entries,
            final_count,
            overall_conversion_rate: percentage(final_count, total_entries),
            steps,
            diagnostics: outcome.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_funnel, UserRecord};

    fn records() -> Vec<UserRecord> {
        vec![
            UserRecord::new("1", "agreement"),
            UserRecord::new("2", "birth_date"),
            UserRecord::new("3", "complete"),
            UserRecord::new("4", "complete"),
        ]
    }

    #[test]
    fn test_forward_report_rates() {
        let outcome = compute_funnel(
            &records(),
            &["agreement", "birth_date", "complete"],
            CountingPolicy::CumulativeForward,
        )
        .unwrap();
        let report = FunnelReport::from_outcome(&outcome);

        assert_eq!(report.total_entries, 4);
        assert_eq!(report.final_count, 2);
        assert_eq!(report.overall_conversion_rate, 50.0);

        assert_eq!(report.steps[0].conversion_rate, 100.0);
        assert_eq!(report.steps[0].drop_off_rate, 0.0);
        assert_eq!(report.steps[1].conversion_rate, 75.0);
        assert_eq!(report.steps[1].drop_off_rate, 25.0);
        assert_eq!(report.steps[1].share_of_entries, 75.0);
        assert!((report.steps[2].conversion_rate - 66.666).abs() < 0.01);
        assert_eq!(report.steps[2].display_name, "Onboarding complete");
    }

    #[test]
    fn test_zero_previous_count() {
        let records = vec![UserRecord::new("1", "complete")];
        let outcome = compute_funnel(
            &records,
            &["agreement", "birth_date", "complete"],
            CountingPolicy::StageExact,
        )
        .unwrap();
        let report = FunnelReport::from_outcome(&outcome);

        assert_eq!(report.total_entries, 0);
        assert_eq!(report.overall_conversion_rate, 0.0);
        // Previous stage had nobody, so there is nothing to convert from
        assert_eq!(report.steps[2].conversion_rate, 0.0);
        assert_eq!(report.steps[2].drop_off_rate, 100.0);
    }

    #[test]
    fn test_backward_report_never_negative_drop_off() {
        let outcome = compute_funnel(
            &records(),
            &["agreement", "birth_date", "complete"],
            CountingPolicy::CumulativeBackward,
        )
        .unwrap();
        let report = FunnelReport::from_outcome(&outcome);

        assert_eq!(report.steps[1].conversion_rate, 200.0);
        assert_eq!(report.steps[1].drop_off_rate, 0.0);
        assert_eq!(report.diagnostics.recognized, 4);
    }
}
