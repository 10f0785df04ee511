pub mod config;
pub mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};
use page_fetcher::{HttpTransport, PageFetcher};

pub use config::Config;

pub struct AppState {
    pub fetcher: PageFetcher<Arc<dyn HttpTransport>>,
}

impl AppState {
    pub fn new(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            fetcher: PageFetcher::new(config.domain_mappings.clone(), transport),
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/get", get(routes::get_page))
        .route("/info", get(routes::page_info))
        .route("/raw", get(routes::raw_page))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Method + path only; target URLs stay out of the span
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
