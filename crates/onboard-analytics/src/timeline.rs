//! Users per period, keyed on the date they accepted the agreement

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::UserProfile;
use onboard_core::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Day,
    /// Monday-based weeks
    Week,
    Month,
}

impl TimeUnit {
    /// First day of the period containing `date`
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            TimeUnit::Day => date,
            TimeUnit::Week => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(offset)).unwrap_or(date)
            }
            TimeUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Day => write!(f, "day"),
            TimeUnit::Week => write!(f, "week"),
            TimeUnit::Month => write!(f, "month"),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(TimeUnit::Day),
            "week" | "weeks" => Ok(TimeUnit::Week),
            "month" | "months" => Ok(TimeUnit::Month),
            other => Err(ServiceError::validation(format!(
                "unknown time unit '{}', expected day, week or month",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub period_start: NaiveDate,
    pub user_count: u64,
}

/// Count users per period of `agreement_accepted`, oldest period first.
/// Users without an agreement date are skipped.
pub fn build_timeline<'a, I>(profiles: I, unit: TimeUnit) -> Vec<TimelinePoint>
where
    I: IntoIterator<Item = &'a UserProfile>,
{
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for accepted in profiles.into_iter().filter_map(|p| p.agreement_accepted) {
        *buckets
            .entry(unit.period_start(accepted.date_naive()))
            .or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(period_start, user_count)| TimelinePoint {
            period_start,
            user_count,
        })
        .collect()
}
