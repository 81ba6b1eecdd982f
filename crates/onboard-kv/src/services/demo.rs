use onboard_core::RawUser;

/// Five sample users shown when the store is empty
pub fn demo_users() -> Vec<RawUser> {
    let rows = [
        ("user:1", "complete", "2024-01-01", "2024-12-31", "True"),
        ("user:2", "agreement", "2024-01-02", "2024-01-15", "False"),
        ("user:3", "birth_date", "2024-01-03", "2024-12-31", "True"),
        ("user:4", "complete", "2024-01-04", "2023-12-31", "False"),
        ("user:5", "gender", "2024-01-05", "2024-12-31", "False"),
    ];

    rows.iter()
        .map(|(key, stage, agreed, expiry, blocked)| {
            RawUser::new(*key)
                .with_field("onboarding_stage", *stage)
                .with_field("agreement_accepted", *agreed)
                .with_field("subscription_expiry", *expiry)
                .with_field("bot_was_blocked", *blocked)
        })
        .collect()
}
