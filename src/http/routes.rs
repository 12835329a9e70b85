//! HTTP route definitions

use axum::{
    extract::{Extension, Query, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Redirect},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::app::AppState;
use crate::feed::{
    filter_items, Facet, FeedItem, FeedQuery, ItemFeed, NewLostFoundItem, NewThriftItem,
    PostError, Poster, Selection,
};
use crate::http::middleware::require_auth;
use crate::http::pages;
use crate::store::GatewayError;
use crate::stats::StatsView;
use crate::util::time::uptime_secs;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/", get(pages::dashboard))
        .route("/lost-found", get(pages::lost_found))
        .route("/lost-found/reload", post(pages::reload_lost_found))
        .route("/lost-found/:id/contact", get(pages::contact_lost_found))
        .route("/thrift", get(pages::thrift))
        .route("/thrift/reload", post(pages::reload_thrift))
        .route("/thrift/:id/contact", get(pages::contact_thrift))
        .route("/api/stats", get(stats_handler))
        .route("/api/lost-found", get(lost_found_feed_handler))
        .route("/api/thrift", get(thrift_feed_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/lost-found/items", post(post_lost_found_handler))
        .route("/api/thrift/items", post(post_thrift_handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Query parameters
// ============================================================================

/// `?q=&type=&selected=` on the lost & found page
#[derive(Debug, Default, Deserialize)]
pub struct LostFoundParams {
    #[serde(default)]
    pub q: String,
    #[serde(default, rename = "type")]
    pub facet: Facet,
    #[serde(default)]
    pub selected: Option<String>,
}

/// `?q=&category=&selected=` on the thrift page
#[derive(Debug, Default, Deserialize)]
pub struct ThriftParams {
    #[serde(default)]
    pub q: String,
    #[serde(default, rename = "category")]
    pub facet: Facet,
    #[serde(default)]
    pub selected: Option<String>,
}

/// Per-request view state of a feed page
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    pub query: FeedQuery,
    pub selection: Selection,
}

impl From<LostFoundParams> for FeedView {
    fn from(params: LostFoundParams) -> Self {
        Self {
            query: FeedQuery::new(params.q, params.facet),
            selection: Selection::from_param(params.selected.as_deref()),
        }
    }
}

impl From<ThriftParams> for FeedView {
    fn from(params: ThriftParams) -> Self {
        Self {
            query: FeedQuery::new(params.q, params.facet),
            selection: Selection::from_param(params.selected.as_deref()),
        }
    }
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    lost_found_items: usize,
    thrift_items: usize,
    stats_stale: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        lost_found_items: state.lost_found.snapshot().items.len(),
        thrift_items: state.thrift.snapshot().items.len(),
        stats_stale: state.stats.view().stale,
    })
}

// ============================================================================
// Stats endpoint
// ============================================================================

async fn stats_handler(State(state): State<AppState>) -> Json<StatsView> {
    Json(state.stats.refresh().await)
}

// ============================================================================
// Feed endpoints
// ============================================================================

#[derive(Serialize)]
pub struct FeedResponse<T> {
    pub items: Vec<T>,
    /// Size of the whole snapshot before filtering
    pub total: usize,
    pub loading: bool,
    pub error: Option<&'static str>,
}

async fn feed_response<T: FeedItem>(feed: &ItemFeed<T>, query: &FeedQuery) -> FeedResponse<T> {
    feed.mount().await;
    let snapshot = feed.snapshot();

    FeedResponse {
        items: filter_items(&snapshot.items, query)
            .into_iter()
            .cloned()
            .collect(),
        total: snapshot.items.len(),
        loading: snapshot.loading,
        error: snapshot.error,
    }
}

async fn lost_found_feed_handler(
    State(state): State<AppState>,
    Query(params): Query<LostFoundParams>,
) -> Json<FeedResponse<crate::store::LostFoundItem>> {
    let view = FeedView::from(params);
    Json(feed_response(&state.lost_found, &view.query).await)
}

async fn thrift_feed_handler(
    State(state): State<AppState>,
    Query(params): Query<ThriftParams>,
) -> Json<FeedResponse<crate::store::ThriftItem>> {
    let view = FeedView::from(params);
    Json(feed_response(&state.thrift, &view.query).await)
}

// ============================================================================
// Posting endpoints
// ============================================================================

async fn post_lost_found_handler(
    State(state): State<AppState>,
    Extension(poster): Extension<Poster>,
    Json(draft): Json<NewLostFoundItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = state.lost_found.post(draft, &poster).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn post_thrift_handler(
    State(state): State<AppState>,
    Extension(poster): Extension<Poster>,
    Json(draft): Json<NewThriftItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = state.thrift.post(draft, &poster).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// ============================================================================
// Contact redirects
// ============================================================================

/// Redirect to the mail compose link for an item in the current snapshot
pub(crate) async fn contact_redirect<T: FeedItem>(
    feed: &ItemFeed<T>,
    id: &str,
    endpoint: &str,
) -> Result<Redirect, AppError> {
    feed.mount().await;
    let snapshot = feed.snapshot();
    let item = Selection::from_param(Some(id))
        .resolve(&snapshot.items)
        .ok_or_else(|| AppError::NotFound(format!("item {}", id)))?;
    Ok(Redirect::to(&item.contact_link(endpoint)))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Invalid(msg) => AppError::BadRequest(msg),
            PostError::Gateway(e) => AppError::Gateway(e),
            PostError::Encode(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Not found: {}", msg)),
            AppError::Gateway(e) => {
                tracing::error!(error = %e, "Backend request failed");
                (StatusCode::BAD_GATEWAY, "Backend request failed".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
