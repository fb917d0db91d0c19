//! Hugging Face inference backend
//!
//! HTTP client for the hosted zero-shot classification endpoint
//! (`POST <host>/models/<model>`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::parsing::{parse_zero_shot_response, truncate_body};
use super::{BackendError, BackendResult, ZeroShotBackend};

/// Default public inference host
pub const DEFAULT_HOST: &str = "https://router.huggingface.co/hf-inference";

/// Default multilingual NLI model (handles English and Swahili descriptions)
pub const DEFAULT_MODEL: &str = "MoritzLaurer/mDeBERTa-v3-base-mnli-xnli";

/// Zero-shot classifier served by the Hugging Face inference API
#[derive(Clone)]
pub struct HuggingFaceBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HuggingFaceBackend {
    /// Create a new backend with the client's default timeout
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create a backend whose HTTP requests give up after `timeout`
    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http_client,
            ..Self::new(base_url, model)
        }
    }

    /// Attach a bearer token
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

/// Request body for zero-shot classification
#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[async_trait]
impl ZeroShotBackend for HuggingFaceBackend {
    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> BackendResult<Vec<String>> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters { candidate_labels },
        };

        let mut builder = self.http_client.post(self.endpoint()).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "Inference response: {}", truncate_body(&body));

        parse_zero_shot_response(status, &body)
    }

    async fn health_check(&self) -> bool {
        match self.classify("health check", &["ok", "not ok"]).await {
            Ok(labels) => !labels.is_empty(),
            Err(BackendError::Loading(_)) => false,
            Err(e) => {
                debug!(error = %e, "Inference health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
