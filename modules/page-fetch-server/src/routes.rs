use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use page_fetcher::{FetchOutcome, FetchRequest, Format, Page};
use serde::Deserialize;
use tracing::info;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    url: String,
    charset: Option<String>,
    format: Option<String>,
}

impl PageQuery {
    fn into_request(self, format: Format, method: Method) -> FetchRequest {
        FetchRequest::builder()
            .url(self.url)
            .format(format)
            .method(method)
            .charset(self.charset)
            .build()
    }
}

/// `/get`: JSON outcome. Format comes from `?format=`, method from the
/// incoming request, so `HEAD /get` yields the info shape.
pub async fn get_page(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<PageQuery>,
) -> Response {
    let format = query
        .format
        .as_deref()
        .map(Format::from_param)
        .unwrap_or_default();
    let outcome = state
        .fetcher
        .fetch_page(query.into_request(format, method))
        .await;
    log_outcome(&outcome);
    Json(outcome).into_response()
}

/// `/info`: headers-only JSON.
pub async fn page_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let outcome = state
        .fetcher
        .fetch_page(query.into_request(Format::Info, Method::HEAD))
        .await;
    log_outcome(&outcome);
    Json(outcome).into_response()
}

/// `/raw`: the upstream body itself, with its content type.
pub async fn raw_page(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<PageQuery>,
) -> Response {
    let outcome = state
        .fetcher
        .fetch_page(query.into_request(Format::Raw, method))
        .await;
    log_outcome(&outcome);

    match outcome {
        FetchOutcome::Success(Page::Raw(raw)) => (
            StatusCode::OK,
            content_type_header(raw.content_type.as_deref()),
            raw.content.into_bytes(),
        )
            .into_response(),
        FetchOutcome::HttpError(page) => (
            StatusCode::from_u16(page.status.http_code).unwrap_or(StatusCode::BAD_GATEWAY),
            content_type_header(page.status.content_type.as_deref()),
            page.contents,
        )
            .into_response(),
        FetchOutcome::TransportError(error) => (
            StatusCode::BAD_GATEWAY,
            Json(FetchOutcome::TransportError(error)),
        )
            .into_response(),
        other => Json(other).into_response(),
    }
}

fn content_type_header(content_type: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(value) = content_type.and_then(|v| HeaderValue::from_str(v).ok()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers
}

fn log_outcome(outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Success(_) => info!(http_code = ?outcome.http_code(), "Fetch served"),
        FetchOutcome::HttpError(page) => {
            info!(http_code = page.status.http_code, "Fetch served upstream error")
        }
        FetchOutcome::TransportError(e) => info!(error = %e, "Fetch failed"),
    }
}
