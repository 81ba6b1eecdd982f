/// Onboarding stages in the order a user walks through them.
pub const DEFAULT_ONBOARDING_STAGES: [&str; 10] = [
    "agreement",
    "birth_date",
    "gender",
    "goal",
    "activity_level",
    "current_weight",
    "target_weight",
    "height",
    "daily_calories",
    "complete",
];

/// Key pattern under which user hashes are stored.
pub const DEFAULT_USER_KEY_PATTERN: &str = "user:*";
