//! Funnel aggregation
//!
//! Records are bucketed by stage in a single pass, deduplicating by user id,
//! and the per-policy counts are then derived from the bucket sizes with a
//! prefix or suffix sum. The whole computation is linear in the number of
//! records plus the number of stages.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::{
    CountingPolicy, FunnelDiagnostics, FunnelError, FunnelOutcome, FunnelRow, StageOrder,
    UserRecord,
};

/// Compute the funnel for `records` over an unvalidated stage order.
///
/// Fails with [`FunnelError::InvalidStageOrder`] when `stage_order` is empty or
/// repeats a label. Records at unknown or missing stages are never an error;
/// they are left out of every count and reported in the diagnostics.
pub fn compute_funnel<'a, I, S>(
    records: I,
    stage_order: &[S],
    policy: CountingPolicy,
) -> Result<FunnelOutcome, FunnelError>
where
    I: IntoIterator<Item = &'a UserRecord>,
    S: AsRef<str>,
{
    let order = StageOrder::new(stage_order.iter().map(|s| s.as_ref().to_string()))?;
    Ok(FunnelAggregator::new(order).aggregate(records, policy))
}

/// Aggregates user records over a fixed, already validated stage order
#[derive(Debug, Clone, Default)]
pub struct FunnelAggregator {
    order: StageOrder,
}

/// Distinct users per stage, plus what was skipped on the way
struct StageBuckets {
    sizes: Vec<u64>,
    diagnostics: FunnelDiagnostics,
}

impl FunnelAggregator {
    pub fn new(order: StageOrder) -> Self {
        Self { order }
    }

    /// Validate `labels` and build an aggregator over them
    pub fn with_stages<I, S>(labels: I) -> Result<Self, FunnelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(StageOrder::new(labels)?))
    }

    pub fn stage_order(&self) -> &StageOrder {
        &self.order
    }

    /// One row per stage, in stage order, counted under `policy`
    pub fn aggregate<'a, I>(&self, records: I, policy: CountingPolicy) -> FunnelOutcome
    where
        I: IntoIterator<Item = &'a UserRecord>,
    {
        let buckets = self.bucket(records);
        self.outcome(&buckets, policy)
    }

    /// The same records counted under every policy, bucketed only once
    pub fn aggregate_all<'a, I>(&self, records: I) -> Vec<FunnelOutcome>
    where
        I: IntoIterator<Item = &'a UserRecord>,
    {
        let buckets = self.bucket(records);
        CountingPolicy::ALL
            .iter()
            .map(|policy| self.outcome(&buckets, *policy))
            .collect()
    }

    fn bucket<'a, I>(&self, records: I) -> StageBuckets
    where
        I: IntoIterator<Item = &'a UserRecord>,
    {
        let mut diagnostics = FunnelDiagnostics::default();
        // Furthest known stage reached by each user
        let mut reached: HashMap<&'a str, usize> = HashMap::new();
        let mut conflicting: HashSet<&'a str> = HashSet::new();

        for record in records {
            diagnostics.total_records += 1;

            let stage = match record.stage.as_deref() {
                Some(stage) if !stage.trim().is_empty() => stage,
                _ => {
                    diagnostics.missing_stage += 1;
                    continue;
                }
            };

            let Some(position) = self.order.index_of(stage) else {
                diagnostics.unrecognized += 1;
                continue;
            };

            match reached.entry(record.id.as_str()) {
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
                Entry::Occupied(mut entry) => {
                    if *entry.get() == position {
                        diagnostics.duplicate_records += 1;
                    } else {
                        conflicting.insert(record.id.as_str());
                        if position > *entry.get() {
                            entry.insert(position);
                        }
                    }
                }
            }
        }

        let mut sizes = vec![0u64; self.order.len()];
        for position in reached.values() {
            sizes[*position] += 1;
        }

        diagnostics.recognized = reached.len() as u64;
        diagnostics.conflicting_duplicates = conflicting.len() as u64;

        debug!(
            "Bucketed {} records: {} recognized, {} unrecognized, {} without stage, {} duplicates",
            diagnostics.total_records,
            diagnostics.recognized,
            diagnostics.unrecognized,
            diagnostics.missing_stage,
            diagnostics.duplicate_records
        );

        StageBuckets { sizes, diagnostics }
    }

    fn outcome(&self, buckets: &StageBuckets, policy: CountingPolicy) -> FunnelOutcome {
        let counts = match policy {
            CountingPolicy::StageExact => buckets.sizes.clone(),
            CountingPolicy::CumulativeForward => {
                let mut counts = buckets.sizes.clone();
                for i in (0..counts.len().saturating_sub(1)).rev() {
                    counts[i] += counts[i + 1];
                }
                counts
            }
            CountingPolicy::CumulativeBackward => {
                let mut counts = buckets.sizes.clone();
                for i in 1..counts.len() {
                    counts[i] += counts[i - 1];
                }
                counts
            }
        };

        let rows = self
            .order
            .labels()
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(order, (stage, count))| FunnelRow {
                stage: stage.clone(),
                count,
                order,
            })
            .collect();

        FunnelOutcome {
            policy,
            rows,
            diagnostics: buckets.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_records() -> Vec<UserRecord> {
        vec![
            UserRecord::new("1", "agreement"),
            UserRecord::new("2", "birth_date"),
            UserRecord::new("3", "complete"),
            UserRecord::new("4", "complete"),
        ]
    }

    const SCENARIO_ORDER: [&str; 3] = ["agreement", "birth_date", "complete"];

    #[test]
    fn test_stage_exact_scenario() {
        let outcome =
            compute_funnel(&scenario_records(), &SCENARIO_ORDER, CountingPolicy::StageExact)
                .unwrap();
        assert_eq!(outcome.counts(), vec![1, 1, 2]);
        assert_eq!(outcome.policy, CountingPolicy::StageExact);
    }

    #[test]
    fn test_cumulative_forward_scenario() {
        let outcome = compute_funnel(
            &scenario_records(),
            &SCENARIO_ORDER,
            CountingPolicy::CumulativeForward,
        )
        .unwrap();
        assert_eq!(outcome.counts(), vec![4, 3, 2]);
    }

    #[test]
    fn test_cumulative_backward_scenario() {
        let outcome = compute_funnel(
            &scenario_records(),
            &SCENARIO_ORDER,
            CountingPolicy::CumulativeBackward,
        )
        .unwrap();
        assert_eq!(outcome.counts(), vec![1, 2, 4]);
    }

    #[test]
    fn test_rows_carry_stage_and_order() {
        let outcome =
            compute_funnel(&scenario_records(), &SCENARIO_ORDER, CountingPolicy::StageExact)
                .unwrap();
        let stages: Vec<&str> = outcome.rows.iter().map(|r| r.stage.as_str()).collect();
        let orders: Vec<usize> = outcome.rows.iter().map(|r| r.order).collect();
        assert_eq!(stages, SCENARIO_ORDER);
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_unrecognized_stage_is_reported_not_counted() {
        let mut records = scenario_records();
        records.push(UserRecord::new("5", "unknown_stage"));

        for (policy, expected) in [
            (CountingPolicy::StageExact, vec![1, 1, 2]),
            (CountingPolicy::CumulativeForward, vec![4, 3, 2]),
            (CountingPolicy::CumulativeBackward, vec![1, 2, 4]),
        ] {
            let outcome = compute_funnel(&records, &SCENARIO_ORDER, policy).unwrap();
            assert_eq!(outcome.counts(), expected, "Failed for {}", policy);
            assert_eq!(outcome.diagnostics.unrecognized, 1);
            assert_eq!(outcome.diagnostics.recognized, 4);
            assert_eq!(outcome.diagnostics.total_records, 5);
        }
    }

    #[test]
    fn test_missing_and_blank_stages() {
        let records = vec![
            UserRecord::new("1", "agreement"),
            UserRecord::without_stage("2"),
            UserRecord::new("3", "   "),
        ];
        let outcome =
            compute_funnel(&records, &SCENARIO_ORDER, CountingPolicy::CumulativeForward).unwrap();

        assert_eq!(outcome.counts(), vec![1, 0, 0]);
        assert_eq!(outcome.diagnostics.missing_stage, 2);
        assert_eq!(outcome.diagnostics.unrecognized, 0);
    }

    #[test]
    fn test_duplicate_id_same_stage_counts_once() {
        let records = vec![
            UserRecord::new("1", "complete"),
            UserRecord::new("1", "complete"),
            UserRecord::new("2", "complete"),
        ];
        let outcome = compute_funnel(&records, &SCENARIO_ORDER, CountingPolicy::StageExact).unwrap();

        assert_eq!(outcome.count_for("complete"), Some(2));
        assert_eq!(outcome.diagnostics.duplicate_records, 1);
        assert_eq!(outcome.diagnostics.conflicting_duplicates, 0);
    }

    #[test]
    fn test_conflicting_duplicate_keeps_furthest_stage() {
        let records = vec![
            UserRecord::new("1", "birth_date"),
            UserRecord::new("1", "agreement"),
            UserRecord::new("1", "complete"),
        ];
        let outcome = compute_funnel(&records, &SCENARIO_ORDER, CountingPolicy::StageExact).unwrap();

        assert_eq!(outcome.counts(), vec![0, 0, 1]);
        assert_eq!(outcome.diagnostics.recognized, 1);
        assert_eq!(outcome.diagnostics.conflicting_duplicates, 1);
    }

    #[test]
    fn test_empty_records_all_zero() {
        let records: Vec<UserRecord> = vec![];
        for policy in CountingPolicy::ALL {
            let outcome = compute_funnel(&records, &SCENARIO_ORDER, policy).unwrap();
            assert_eq!(outcome.counts(), vec![0, 0, 0]);
            assert_eq!(outcome.diagnostics, FunnelDiagnostics::default());
        }
    }

    #[test]
    fn test_invalid_stage_orders() {
        let records = scenario_records();

        let empty: [&str; 0] = [];
        assert!(matches!(
            compute_funnel(&records, &empty, CountingPolicy::StageExact),
            Err(FunnelError::InvalidStageOrder { .. })
        ));

        assert!(matches!(
            compute_funnel(
                &records,
                &["agreement", "complete", "agreement"],
                CountingPolicy::CumulativeForward
            ),
            Err(FunnelError::InvalidStageOrder { .. })
        ));
    }

    #[test]
    fn test_single_stage_order() {
        let records = vec![UserRecord::new("1", "only"), UserRecord::new("2", "only")];
        for policy in CountingPolicy::ALL {
            let outcome = compute_funnel(&records, &["only"], policy).unwrap();
            assert_eq!(outcome.counts(), vec![2]);
        }
    }

    #[test]
    fn test_aggregate_all_matches_individual_calls() {
        let aggregator = FunnelAggregator::with_stages(SCENARIO_ORDER).unwrap();
        let records = scenario_records();

        let all = aggregator.aggregate_all(&records);
        assert_eq!(all.len(), 3);
        for outcome in all {
            assert_eq!(outcome, aggregator.aggregate(&records, outcome.policy));
        }
    }

    #[test]
    fn test_default_aggregator_uses_onboarding_order() {
        let aggregator = FunnelAggregator::default();
        let records = vec![UserRecord::new("1", "goal")];
        let outcome = aggregator.aggregate(&records, CountingPolicy::CumulativeForward);

        assert_eq!(outcome.rows.len(), 10);
        assert_eq!(outcome.counts(), vec![1, 1, 1, 1, 0, 0, 0, 0, 0, 0]);
    }
}
