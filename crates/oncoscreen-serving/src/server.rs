//! HTTP server hosting the screening form.
//!
//! Routes:
//!
//! | Method | Path                | Purpose                                  |
//! |--------|---------------------|------------------------------------------|
//! | GET    | `/`                 | Form prefilled with sample values        |
//! | POST   | `/predict`          | Bulk comma-separated submission          |
//! | POST   | `/predict/detailed` | Per-feature submission                   |
//! | POST   | `/api/predict`      | JSON submission, JSON verdict            |
//! | GET    | `/image`            | Display image (404 if none was loaded)   |
//! | GET    | `/healthz`          | Liveness                                 |
//!
//! The HTML routes always answer `200 OK`; a rejected submission is shown
//! inline next to the form it came from so the page stays usable.

use crate::artifacts::Artifacts;
use crate::config::ServerConfig;
use crate::error::{ScreeningError, ScreeningResult};
use crate::features::FeatureVector;
use crate::input::field_name;
use crate::page::{InputMode, PageState, Panel};
use crate::screening::Screener;
use crate::verdict::Verdict;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    screener: Screener,
    image: Option<Arc<[u8]>>,
}

impl AppState {
    /// Build state from a screener and an optional display image.
    pub fn new(screener: Screener, image: Option<Vec<u8>>) -> Self {
        Self {
            screener,
            image: image.map(Arc::from),
        }
    }

    /// Build state from loaded artifacts.
    pub fn from_artifacts(artifacts: &Artifacts) -> Self {
        Self::new(Screener::from_artifacts(artifacts), artifacts.image.clone())
    }
}

/// JSON errors returned by `/api/predict`.
#[derive(Debug)]
pub enum ApiError {
    /// The body is not a valid [`ApiRequest`]
    Malformed(JsonRejection),
    /// The submission was parsed but could not be screened
    Screening(ScreeningError),
}

impl From<ScreeningError> for ApiError {
    fn from(err: ScreeningError) -> Self {
        Self::Screening(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Malformed(rejection) => (
                StatusCode::BAD_REQUEST,
                "MALFORMED_REQUEST",
                rejection.body_text(),
            ),
            ApiError::Screening(err @ ScreeningError::InvalidFeatureCount { .. }) => (
                StatusCode::BAD_REQUEST,
                "INVALID_FEATURE_COUNT",
                err.to_string(),
            ),
            ApiError::Screening(err @ ScreeningError::NonNumericToken { .. }) => {
                (StatusCode::BAD_REQUEST, "NON_NUMERIC_TOKEN", err.to_string())
            }
            ApiError::Screening(err) => {
                error!("Screening failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INFERENCE_FAILURE",
                    err.to_string(),
                )
            }
        };
        (
            status,
            Json(serde_json::json!({ "error": { "code": code, "message": message } })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct BulkForm {
    #[serde(default)]
    features: String,
}

/// Body of `/api/predict`: either parsed values or the raw bulk text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiRequest {
    /// Already-numeric measurements
    Features {
        /// Measurements in feature order
        features: Vec<f64>,
    },
    /// Comma-separated text, parsed like the bulk form
    Text {
        /// Comma-separated measurements
        text: String,
    },
}

/// Build the application router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_bulk))
        .route("/predict/detailed", post(predict_detailed))
        .route("/api/predict", post(api_predict))
        .route("/image", get(image))
        .route("/healthz", get(healthz))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(PageState::initial(state.image.is_some()).render())
}

async fn predict_bulk(State(state): State<AppState>, Form(form): Form<BulkForm>) -> Html<String> {
    let screener = state.screener.clone();
    let text = form.features.clone();
    let result = run_blocking(move || screener.screen_bulk(&text)).await;
    log_failure(&result);

    let mut page = PageState::initial(state.image.is_some());
    page.bulk_input = form.features;
    page.bulk_panel = Some(Panel::from_result(result, InputMode::Bulk));
    Html(page.render())
}

async fn predict_detailed(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Html<String> {
    let screener = state.screener.clone();
    let submitted = fields.clone();
    let result = run_blocking(move || screener.screen_fields(&submitted)).await;
    log_failure(&result);

    let mut page = PageState::initial(state.image.is_some());
    page.detailed_inputs = (0..page.detailed_inputs.len())
        .map(|i| fields.get(&field_name(i)).cloned().unwrap_or_default())
        .collect();
    page.detailed_panel = Some(Panel::from_result(result, InputMode::Detailed));
    Html(page.render())
}

async fn api_predict(
    State(state): State<AppState>,
    request: Result<Json<ApiRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let Json(request) = request?;
    let screener = state.screener.clone();
    let verdict = run_blocking(move || match request {
        ApiRequest::Features { features } => screener.screen(&FeatureVector::new(features)?),
        ApiRequest::Text { text } => screener.screen_bulk(&text),
    })
    .await?;
    Ok(Json(verdict))
}

/// Run a screening call on the blocking pool; Candle evaluation is CPU-bound.
async fn run_blocking<F>(f: F) -> ScreeningResult<Verdict>
where
    F: FnOnce() -> ScreeningResult<Verdict> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScreeningError::inference(format!("screening task failed: {e}")))?
}

async fn image(State(state): State<AppState>) -> Response {
    match state.image {
        Some(bytes) => ([(CONTENT_TYPE, "image/png")], bytes.to_vec()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn healthz() -> &'static str {
    "OK"
}

fn log_failure(result: &ScreeningResult<Verdict>) {
    if let Err(e) = result {
        if !e.is_input_error() {
            error!("Screening failed: {}", e);
        }
    }
}

/// The form server: validated configuration plus loaded artifacts.
///
/// # Example
///
/// ```no_run
/// use oncoscreen_serving::{Server, ServerConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServerConfig::builder()
///     .port(8501)
///     .artifacts_dir("./artifacts")
///     .build();
///
/// let server = Server::new(config)?;
/// server
///     .serve(async {
///         let _ = tokio::signal::ctrl_c().await;
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Validate `config` and load its artifacts.
    pub fn new(config: ServerConfig) -> ScreeningResult<Self> {
        config
            .validate()
            .map_err(|e| ScreeningError::config(e.to_string()))?;
        let artifacts = Artifacts::load_with(&config.artifacts_dir, &config.artifacts)?;
        let state = AppState::from_artifacts(&artifacts);
        Ok(Self { config, state })
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router for this server.
    pub fn router(&self) -> Router {
        router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> ScreeningResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.socket_addr()).await?;
        info!("Server started on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("screener", &self.state.screener)
            .field("has_image", &self.state.image.is_some())
            .finish()
    }
}
