pub mod errors;
mod headers;
mod routes_api;
mod routes_assets;
mod routes_docs;
mod routes_export;
mod routes_page;

use crate::config::Config;
use crate::render::PageRenderer;
use crate::search::SearchService;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: SearchService,
    pub config: Arc<Config>,
    pub pages: Arc<PageRenderer>,
}

pub fn router(service: SearchService) -> Router {
    let config = Arc::new(service.config().clone());
    let state = AppState {
        service,
        config,
        pages: Arc::new(PageRenderer::new()),
    };

    let cors = match &state.config.cors_allowed_origins {
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any),
        Some(list) => {
            let origins: Vec<axum::http::HeaderValue> = list
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_headers(Any)
                .allow_methods(Any)
        }
    };

    let bounded = Router::<AppState>::new()
        .merge(routes_docs::routes_docs())
        .route("/", get(routes_page::publications))
        .route("/publications", get(routes_page::publications))
        .route("/api/publications", get(routes_api::publications))
        .route("/assets/*path", get(routes_assets::asset))
        .route("/health", get(health))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.request_timeout_secs),
        ));

    // Downloads run as long as the stream does.
    let downloads = Router::<AppState>::new().route("/export", get(routes_export::export));

    bounded
        .merge(downloads)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(headers::security_headers))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
