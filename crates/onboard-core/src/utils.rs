//! Common utility functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::UtcDateTime;

/// Mask sensitive data for logging
pub fn mask_sensitive(data: &str) -> String {
    let chars: Vec<char> = data.chars().collect();
    if chars.len() <= 8 {
        "***".to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}

/// Interpret a loosely typed flag value.
///
/// `true`, `1` and `yes` (any case, surrounding whitespace ignored) are truthy;
/// everything else, including the empty string, is not.
///
/// ```
/// use onboard_core::parse_truthy;
///
/// assert!(parse_truthy("True"));
/// assert!(parse_truthy(" yes "));
/// assert!(!parse_truthy("0"));
/// ```
pub fn parse_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Parse a timestamp in any of the formats user records are written with.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]` and a
/// bare `YYYY-MM-DD` (midnight UTC). Naive values are taken as UTC. Returns
/// `None` for anything unparseable.
pub fn parse_datetime(value: &str) -> Option<UtcDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
