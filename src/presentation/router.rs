use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::config::ServerSettings;
use crate::presentation::handlers::{health_handler, transcribe_and_reply_handler};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState, server: &ServerSettings) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(health_handler))
        .route("/transcribe_and_reply/", post(transcribe_and_reply_handler))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors_layer(&server.allowed_origins))
        .with_state(state)
}

/// Any origin when none (or `*`) is configured; otherwise an explicit list with credentials.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() || allowed_origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
