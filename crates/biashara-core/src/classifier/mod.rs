//! Transaction category classification
//!
//! Classification is two-layered:
//! - Deterministic override rules (`rules`) checked first, in priority order
//! - A pluggable zero-shot text classifier consulted only when no rule matches
//!
//! # Architecture
//!
//! - `ZeroShotBackend` trait: the narrow contract every external classifier meets
//! - `ZeroShotClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `HuggingFaceBackend`, `MockBackend`
//! - `CategoryClassifier`: owns an optional client and turns every outcome,
//!   including failures, into a `Category`
//!
//! # Usage
//!
//! ```rust,ignore
//! let classifier = CategoryClassifier::from_settings(&settings.classifier);
//! let category = classifier.classify("SPORTPESA deposit").await;
//! assert_eq!(category, Category::GamblingBetting);
//! ```

pub mod engine;
mod huggingface;
mod mock;
pub mod parsing;
pub mod rules;

pub use engine::{CategoryClassifier, Classification, ClassificationSource, ModelOutcome};
pub use huggingface::{HuggingFaceBackend, DEFAULT_HOST, DEFAULT_MODEL};
pub use mock::{MockBackend, MockBehavior};
pub use rules::{match_rule, OverrideRule, OVERRIDE_RULES};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{BackendKind, ClassifierSettings};

/// Failure talking to a zero-shot backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The model is warming up; a later call may succeed
    #[error("Model is loading: {0}")]
    Loading(String),

    #[error("Classifier API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed classifier response: {0}")]
    Malformed(String),

    #[error("Classifier call timed out")]
    Timeout,

    #[error("Classifier transport error: {0}")]
    Transport(String),
}

impl BackendError {
    /// Whether this is the transient "model loading" condition
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Trait defining the interface for zero-shot text classifiers
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ZeroShotBackend: Send + Sync {
    /// Rank `candidate_labels` for `text`, most confident first
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> BackendResult<Vec<String>>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete zero-shot client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ZeroShotClient {
    /// Hugging Face inference API
    HuggingFace(HuggingFaceBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ZeroShotClient {
    /// Build a client from settings
    ///
    /// Returns None when the backend is disabled.
    pub fn from_settings(settings: &ClassifierSettings) -> Option<Self> {
        match settings.backend {
            BackendKind::HuggingFace => Some(ZeroShotClient::HuggingFace(
                HuggingFaceBackend::with_timeout(&settings.host, &settings.model, settings.timeout)
                    .with_api_key(settings.api_key.clone()),
            )),
            BackendKind::Mock => Some(ZeroShotClient::Mock(MockBackend::new())),
            BackendKind::None => None,
        }
    }

    /// Create a Hugging Face backend directly
    pub fn huggingface(host: &str, model: &str) -> Self {
        ZeroShotClient::HuggingFace(HuggingFaceBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ZeroShotClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ZeroShotBackend for ZeroShotClient {
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> BackendResult<Vec<String>> {
        match self {
            ZeroShotClient::HuggingFace(b) => b.classify(text, candidate_labels).await,
            ZeroShotClient::Mock(b) => b.classify(text, candidate_labels).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ZeroShotClient::HuggingFace(b) => b.health_check().await,
            ZeroShotClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ZeroShotClient::HuggingFace(b) => b.model(),
            ZeroShotClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ZeroShotClient::HuggingFace(b) => b.host(),
            ZeroShotClient::Mock(b) => b.host(),
        }
    }
}
