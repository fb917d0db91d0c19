//! Test utilities for biashara-core
//!
//! Provides a mock zero-shot inference server speaking the Hugging Face
//! wire format, for HTTP-level backend tests and offline development.
//!
//! The response is picked from the input text:
//! - contains `loading` → 503 with a "currently loading" error body
//! - contains `server error` → 500 with a plain error body
//! - contains `garbage` → 200 with a non-JSON body
//! - contains `list shape` → 200 with a `[{label, score}]` list
//! - contains `slow` → answers normally after two seconds
//! - anything else → 200 with `{sequence, labels, scores}`

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use crate::classifier::{MockBackend, ZeroShotBackend};

/// What the server saw on the last request
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub model: String,
    pub authorization: Option<String>,
    pub inputs: String,
}

#[derive(Clone, Default)]
struct ServerState {
    last: Arc<Mutex<Option<RecordedRequest>>>,
    count: Arc<Mutex<usize>>,
}

/// Mock inference server for testing and development
pub struct MockInferenceServer {
    addr: SocketAddr,
    state: ServerState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockInferenceServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = ServerState::default();
        let app = Router::new()
            .route("/models/*model", post(handle_zero_shot))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of requests served
    pub fn request_count(&self) -> usize {
        self.state.count.lock().map(|c| *c).unwrap_or(0)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockInferenceServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Deserialize)]
struct ZeroShotRequest {
    inputs: String,
    parameters: ZeroShotParameters,
}

#[derive(Debug, Deserialize)]
struct ZeroShotParameters {
    candidate_labels: Vec<String>,
}

async fn handle_zero_shot(
    State(state): State<ServerState>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ZeroShotRequest>,
) -> Response {
    if let Ok(mut last) = state.last.lock() {
        *last = Some(RecordedRequest {
            model: model.clone(),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            inputs: request.inputs.clone(),
        });
    }
    if let Ok(mut count) = state.count.lock() {
        *count += 1;
    }

    let text = request.inputs.to_lowercase();

    if text.contains("loading") {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": format!("Model {} is currently loading", model),
                "estimated_time": 20.0
            })),
        )
            .into_response();
    }
    if text.contains("server error") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal inference failure" })),
        )
            .into_response();
    }
    if text.contains("garbage") {
        return (StatusCode::OK, "definitely not json").into_response();
    }
    if text.contains("slow") {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    let labels: Vec<&str> = request
        .parameters
        .candidate_labels
        .iter()
        .map(String::as_str)
        .collect();
    let ranked = MockBackend::new()
        .classify(&request.inputs, &labels)
        .await
        .unwrap_or_default();
    let scores: Vec<f64> = (0..ranked.len())
        .map(|i| 0.9 / (i as f64 + 1.0))
        .collect();

    if text.contains("list shape") {
        // Deliberately unsorted to exercise client-side ranking
        let mut items: Vec<_> = ranked
            .iter()
            .zip(&scores)
            .map(|(label, score)| json!({ "label": label, "score": score }))
            .collect();
        items.reverse();
        return Json(json!(items)).into_response();
    }

    Json(json!({
        "sequence": request.inputs,
        "labels": ranked,
        "scores": scores,
    }))
    .into_response()
}
