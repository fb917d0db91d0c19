//! Biashara Web Server
//!
//! Axum-based REST API in front of the credit pipeline:
//! - `POST /api/upload` statement upload (multipart, 10 MB max)
//! - `GET /api/dashboard-data` credit report for a subject
//! - `GET /api/health` liveness plus classifier reachability
//!
//! Static dashboard files are served as the fallback route when configured.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use biashara_core::classifier::{CategoryClassifier, ZeroShotBackend};
use biashara_core::config::{ServerSettings, Settings};
use biashara_core::db::Database;
use biashara_core::pipeline::CreditPipeline;

mod handlers;

/// Maximum statement upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = any origin, matching the dashboard's dev setup)
    pub allowed_origins: Vec<String>,
    /// Directory of static dashboard files
    pub static_dir: Option<PathBuf>,
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            allowed_origins: settings.allowed_origins.clone(),
            static_dir: settings.static_dir.clone(),
        }
    }
}

/// How long a classifier health probe result is reused
pub const HEALTH_CACHE_TTL: Duration = Duration::from_secs(30);

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub pipeline: CreditPipeline,
    pub config: ServerConfig,
    /// Last classifier probe (when, reachable)
    classifier_health: Mutex<Option<(Instant, bool)>>,
}

impl AppState {
    pub fn new(db: Database, pipeline: CreditPipeline, config: ServerConfig) -> Self {
        Self {
            db,
            pipeline,
            config,
            classifier_health: Mutex::new(None),
        }
    }

    /// Whether the classifier backend answered a probe within `HEALTH_CACHE_TTL`
    ///
    /// The lock is held while probing so concurrent callers share one request.
    pub async fn classifier_available(&self) -> bool {
        let Some(client) = self.pipeline.classifier().client() else {
            return false;
        };

        let mut cached = self.classifier_health.lock().await;
        if let Some((checked_at, available)) = *cached {
            if checked_at.elapsed() < HEALTH_CACHE_TTL {
                return available;
            }
        }

        let available = client.health_check().await;
        *cached = Some((Instant::now(), available));
        available
    }
}

/// Create the application router
pub fn create_router(db: Database, pipeline: CreditPipeline, config: ServerConfig) -> Router {
    match pipeline.classifier().client() {
        Some(client) => info!(
            "Classifier backend configured: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => info!("Classifier backend disabled; only override rules will apply"),
    }

    let static_dir = config.static_dir.clone();
    let cors = build_cors(&config.allowed_origins);

    let state = Arc::new(AppState::new(db, pipeline, config));

    let api_routes = Router::new()
        .route(
            "/upload",
            post(handlers::upload_statement)
                // Room for multipart framing around a maximum-size file
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)),
        )
        .route("/dashboard-data", get(handlers::dashboard_data))
        .route("/health", get(handlers::health));

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Start the server from resolved settings
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let db = Database::new(&settings.database.path.to_string_lossy())?;
    serve_with(db, &settings).await
}

/// Start the server with an already opened database
pub async fn serve_with(db: Database, settings: &Settings) -> anyhow::Result<()> {
    let classifier = CategoryClassifier::from_settings(&settings.classifier);
    check_classifier_connection(&classifier).await;

    let pipeline = CreditPipeline::new(classifier);
    let app = create_router(db, pipeline, ServerConfig::from(&settings.server));
    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log classifier backend status
async fn check_classifier_connection(classifier: &CategoryClassifier) {
    let Some(client) = classifier.client() else {
        info!("Classifier backend not configured (set BIASHARA_CLASSIFIER_BACKEND to enable)");
        return;
    };

    if client.health_check().await {
        info!("Classifier backend reachable: {} ({})", client.host(), client.model());
    } else {
        warn!(
            "Classifier backend configured but not ready: {} ({}); unmatched rows will be uncategorized",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error, exposing only client-caused failures
    pub fn core(err: biashara_core::Error) -> Self {
        match err {
            biashara_core::Error::Import(msg) => Self::bad_request(&msg),
            biashara_core::Error::NotFound(what) => Self::not_found(&format!("Not found: {}", what)),
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
