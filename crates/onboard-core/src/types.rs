//! Custom types for common data structures

use chrono::{DateTime as ChronoDateTime, Utc};

/// Standard UTC DateTime type used across all Onboard crates
///
/// Serializes as ISO 8601 with a `Z` suffix, e.g. `2024-01-05T00:00:00Z`.
pub type UtcDateTime = ChronoDateTime<Utc>;
