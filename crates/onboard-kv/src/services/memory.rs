use async_trait::async_trait;
use onboard_core::{RawUser, ServiceResult, UserSource};
use tracing::debug;

use super::demo_users;

/// A fixed, vector-backed user source
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserSource {
    users: Vec<RawUser>,
}

impl InMemoryUserSource {
    pub fn new(users: Vec<RawUser>) -> Self {
        Self { users }
    }

    /// Source preloaded with [`demo_users`]
    pub fn demo() -> Self {
        Self::new(demo_users())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserSource for InMemoryUserSource {
    fn source_type(&self) -> &'static str {
        "memory"
    }

    async fn fetch_users(&self) -> ServiceResult<Vec<RawUser>> {
        debug!("Serving {} users from memory", self.users.len());
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_returns_snapshot() {
        let source = InMemoryUserSource::new(vec![
            RawUser::new("user:1").with_field("onboarding_stage", "goal"),
            RawUser::failed("user:2", "boom"),
        ]);

        assert_eq!(source.source_type(), "memory");
        assert_eq!(source.len(), 2);

        let users = source.fetch_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].field("onboarding_stage"), Some("goal"));
        assert_eq!(users[1].error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_demo_source() {
        let source = InMemoryUserSource::demo();
        assert!(!source.is_empty());
        assert_eq!(source.fetch_users().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = InMemoryUserSource::default();
        assert!(source.fetch_users().await.unwrap().is_empty());
    }
}
