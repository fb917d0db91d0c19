//! Category classifier - rules first, zero-shot model second

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::ClassifierSettings;
use crate::models::Category;

use super::rules::match_rule;
use super::{ZeroShotBackend, ZeroShotClient};

/// Default bound on a single model call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of model calls in flight per batch
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What the zero-shot model said, before sentinel mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOutcome {
    /// Top-ranked label, inside the taxonomy
    Label(Category),
    /// Model is loading; try again later
    Unavailable,
    /// Any other failure: error, timeout, empty or unknown label, no backend
    Failed,
}

impl ModelOutcome {
    /// Map the outcome to a category, using sentinels for failures
    pub fn into_category(self) -> Category {
        match self {
            Self::Label(category) => category,
            Self::Unavailable => Category::UncategorizedModelLoading,
            Self::Failed => Category::Uncategorized,
        }
    }
}

/// Where a category came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Rule,
    Model,
    /// A sentinel produced because the model could not answer
    Fallback,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

/// A category with its provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub source: ClassificationSource,
}

/// Classifies transaction descriptions into the fixed category taxonomy
///
/// Never fails: every path ends in a `Category`, with sentinels standing in
/// when the model is loading or unreachable. Holds no mutable state, so one
/// instance can serve concurrent batches.
#[derive(Clone)]
pub struct CategoryClassifier {
    client: Option<ZeroShotClient>,
    timeout: Duration,
    concurrency: usize,
}

impl CategoryClassifier {
    /// Create a classifier around an optional zero-shot client
    pub fn new(client: Option<ZeroShotClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Classifier that only applies the override rules
    pub fn rules_only() -> Self {
        Self::new(None)
    }

    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        Self::new(ZeroShotClient::from_settings(settings))
            .with_timeout(settings.timeout)
            .with_concurrency(settings.concurrency)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn client(&self) -> Option<&ZeroShotClient> {
        self.client.as_ref()
    }

    /// Classify one description
    pub async fn classify(&self, description: &str) -> Category {
        self.classify_detailed(description).await.category
    }

    /// Classify one description, reporting which layer decided
    pub async fn classify_detailed(&self, description: &str) -> Classification {
        if let Some(category) = match_rule(description) {
            debug!(description, category = %category, "Matched override rule");
            return Classification {
                category,
                source: ClassificationSource::Rule,
            };
        }

        let outcome = self.ask_model(description).await;
        let source = match outcome {
            ModelOutcome::Label(_) => ClassificationSource::Model,
            _ => ClassificationSource::Fallback,
        };
        Classification {
            category: outcome.into_category(),
            source,
        }
    }

    /// Classify many descriptions, returning categories in input order
    ///
    /// Up to `concurrency` model calls run at once; a failure only affects
    /// its own description.
    pub async fn classify_batch<S: AsRef<str>>(&self, descriptions: &[S]) -> Vec<Category> {
        let pending: Vec<_> = descriptions.iter().map(|d| self.classify(d.as_ref())).collect();
        stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn ask_model(&self, description: &str) -> ModelOutcome {
        let Some(ref client) = self.client else {
            debug!(description, "No classifier backend configured");
            return ModelOutcome::Failed;
        };

        let labels = Category::candidate_labels();
        let response = tokio::time::timeout(self.timeout, client.classify(description, &labels)).await;

        let ranked = match response {
            Err(_) => {
                warn!(description, timeout = ?self.timeout, "Classifier call timed out");
                return ModelOutcome::Failed;
            }
            Ok(Err(e)) if e.is_loading() => {
                warn!(description, error = %e, "Classifier model is loading");
                return ModelOutcome::Unavailable;
            }
            Ok(Err(e)) => {
                warn!(description, error = %e, "Classifier call failed");
                return ModelOutcome::Failed;
            }
            Ok(Ok(ranked)) => ranked,
        };

        let Some(best) = ranked.first() else {
            warn!(description, "Classifier returned no labels");
            return ModelOutcome::Failed;
        };

        match best.parse::<Category>() {
            Ok(category) if !category.is_sentinel() => {
                debug!(description, category = %category, "Classified by model");
                ModelOutcome::Label(category)
            }
            _ => {
                warn!(description, label = %best, "Classifier returned label outside taxonomy");
                ModelOutcome::Failed
            }
        }
    }
}
