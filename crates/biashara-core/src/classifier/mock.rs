//! Mock backend for testing
//!
//! Provides scripted zero-shot responses without a running inference server.
//! Useful for unit tests and offline demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{BackendError, BackendResult, ZeroShotBackend};

/// What the mock answers with
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Rank labels by simple keyword hints in the text
    #[default]
    Keywords,
    /// Always return this ranking
    Ranked(Vec<String>),
    /// Report the model as still loading
    Loading,
    /// Fail with an API error
    Failing,
    /// Succeed with no labels
    Empty,
}

/// Mock zero-shot backend
///
/// Clones share one call counter so tests can assert how often the model
/// was consulted.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    behavior: MockBehavior,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a keyword-ranking mock
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Always rank `labels` in the given order
    pub fn ranked(labels: &[&str]) -> Self {
        Self::with_behavior(MockBehavior::Ranked(
            labels.iter().map(|l| l.to_string()).collect(),
        ))
    }

    pub fn loading() -> Self {
        Self::with_behavior(MockBehavior::Loading)
    }

    pub fn failing() -> Self {
        Self::with_behavior(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::with_behavior(MockBehavior::Empty)
    }

    /// Sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of classify calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn keyword_hint(text: &str) -> Option<&'static str> {
        let lowered = text.to_lowercase();
        let hints: [(&[&str], &str); 6] = [
            (&["rent", "landlord", "kodi"], "Rent Payments"),
            (&["loan", "fuliza", "m-shwari", "repay"], "Loan Repayment"),
            (
                &["hospital", "clinic", "pharmacy", "chemist"],
                "Healthcare & Medical",
            ),
            (&["school", "fees", "tuition", "college"], "Educational & Learning"),
            (&["stock", "supplier", "wholesale"], "Business Inventory"),
            (&["water", "electricity", "internet"], "Utility Bills"),
        ];
        hints
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(_, label)| *label)
    }
}

#[async_trait]
impl ZeroShotBackend for MockBackend {
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> BackendResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Keywords => {
                let mut ranked: Vec<String> =
                    candidate_labels.iter().map(|l| l.to_string()).collect();
                if let Some(hint) = Self::keyword_hint(text) {
                    if let Some(pos) = ranked.iter().position(|l| l == hint) {
                        let label = ranked.remove(pos);
                        ranked.insert(0, label);
                    }
                }
                Ok(ranked)
            }
            MockBehavior::Ranked(labels) => Ok(labels.clone()),
            MockBehavior::Loading => Err(BackendError::Loading(
                "Model mock/zero-shot is currently loading".to_string(),
            )),
            MockBehavior::Failing => Err(BackendError::Api {
                status: 500,
                message: "mock failure".to_string(),
            }),
            MockBehavior::Empty => Ok(vec![]),
        }
    }

    async fn health_check(&self) -> bool {
        !matches!(self.behavior, MockBehavior::Loading | MockBehavior::Failing)
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 3] = ["Business Inventory", "Rent Payments", "Loan Repayment"];

    #[tokio::test]
    async fn test_keyword_mock_promotes_hint() {
        let mock = MockBackend::new();
        let ranked = mock.classify("Shop rent March", &LABELS).await.unwrap();
        assert_eq!(ranked[0], "Rent Payments");
        assert_eq!(ranked.len(), 3);
    }

    #[tokio::test]
    async fn test_keyword_mock_without_hint_keeps_order() {
        let mock = MockBackend::new();
        let ranked = mock.classify("something else", &LABELS).await.unwrap();
        assert_eq!(ranked, LABELS.to_vec());
    }

    #[tokio::test]
    async fn test_call_counter_is_shared_between_clones() {
        let mock = MockBackend::loading();
        let clone = mock.clone();
        assert!(clone.classify("x", &LABELS).await.unwrap_err().is_loading());
        assert_eq!(mock.calls(), 1);
        assert!(!mock.health_check().await);
    }
}
