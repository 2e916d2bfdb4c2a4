//! Router assembly: HTTP endpoints, legacy aliases, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::config::CorsOrigins;
use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - health check at `/health`
/// - REST API under `/api/v1/...`
/// - legacy `/api/essay-test...` and `/api/results/:id` aliases
/// - CORS from config (`"*"` allows any origin)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins());

    Router::new()
        .route("/health", get(http::http_health))
        // v1
        .route("/api/v1/tests", get(http::http_list_tests))
        .route("/api/v1/tests/:id", get(http::http_get_test))
        .route("/api/v1/tests/:id/submit", post(http::http_submit_for_test))
        .route("/api/v1/results", get(http::http_list_results))
        .route("/api/v1/results/:id", get(http::http_get_result))
        .route(
            "/api/v1/submissions/:id/result",
            get(http::http_get_result_by_submission),
        )
        // Legacy aliases
        .route("/api/essay-test", get(http::http_list_tests))
        .route("/api/essay-test/submit", post(http::http_submit_legacy))
        .route("/api/essay-test/:id", get(http::http_get_test))
        .route("/api/results/:id", get(http::http_get_result))
        .fallback(http::http_not_found)
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(target: "essay_backend", origin = %o, error = %e, "Skipping invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
