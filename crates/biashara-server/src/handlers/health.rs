//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use biashara_core::classifier::ZeroShotBackend;

#[derive(Debug, Serialize)]
pub struct ClassifierStatus {
    pub host: Option<String>,
    pub model: Option<String>,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub classifier: ClassifierStatus,
}

/// GET /api/health - Liveness and classifier reachability
///
/// Reachability comes from a cached probe (see `HEALTH_CACHE_TTL`).
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let classifier = match state.pipeline.classifier().client() {
        Some(client) => ClassifierStatus {
            host: Some(client.host().to_string()),
            model: Some(client.model().to_string()),
            available: state.classifier_available().await,
        },
        None => ClassifierStatus {
            host: None,
            model: None,
            available: false,
        },
    };

    Json(HealthResponse {
        status: "ok",
        classifier,
    })
}
