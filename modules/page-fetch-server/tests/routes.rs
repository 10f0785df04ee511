//! Router tests: each request goes through the full axum stack with a
//! MockTransport standing in for the network.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use page_fetch_server::{app, AppState, Config};
use page_fetcher::testing::MockTransport;
use page_fetcher::{FetchError, HttpTransport};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(transport: MockTransport, mappings: &str) -> Router {
    let config = Config::from_lookup(|key| match key {
        "DOMAIN_MAPPINGS" => Some(mappings.to_string()),
        _ => None,
    })
    .unwrap();
    let transport: Arc<dyn HttpTransport> = Arc::new(transport);
    app(Arc::new(AppState::new(&config, transport)))
}

async fn send(router: Router, method: &str, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn health_check() {
    let (status, _, body) = send(router(MockTransport::new(), ""), "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn get_returns_contents_json() {
    let transport = MockTransport::new().on(
        "http://example.com/",
        200,
        &[("content-type", "text/html")],
        "<h1>hi</h1>",
    );

    let (status, _, body) = send(
        router(transport, ""),
        "GET",
        "/get?url=http%3A%2F%2Fexample.com%2F",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({
            "contents": "<h1>hi</h1>",
            "status": {
                "url": "http://example.com/",
                "content_type": "text/html",
                "content_length": 11,
                "http_code": 200,
            }
        })
    );
}

#[tokio::test]
async fn get_applies_domain_mappings() {
    let transport = MockTransport::new().on("http://10.0.0.5:8080/foo?x=1", 200, &[], "mapped");

    let (_, _, body) = send(
        router(transport, "a.example.com:10.0.0.5:8080"),
        "GET",
        "/get?url=http%3A%2F%2Fa.example.com%2Ffoo%3Fx%3D1",
    )
    .await;

    let value = json_body(&body);
    assert_eq!(value["contents"], "mapped");
    assert_eq!(value["status"]["url"], "http://10.0.0.5:8080/foo?x=1");
}

#[tokio::test]
async fn get_with_info_format() {
    let transport = MockTransport::new().on(
        "http://example.com/",
        200,
        &[("content-type", "text/html"), ("content-length", "42")],
        "",
    );

    let (_, _, body) = send(
        router(transport, ""),
        "GET",
        "/get?url=http%3A%2F%2Fexample.com%2F&format=info",
    )
    .await;

    assert_eq!(
        json_body(&body),
        json!({
            "url": "http://example.com/",
            "content_type": "text/html",
            "content_length": 42,
            "http_code": 200,
        })
    );
}

#[tokio::test]
async fn info_route_without_length() {
    let transport = MockTransport::new().on("http://example.com/", 200, &[], "");

    let (_, _, body) = send(
        router(transport, ""),
        "GET",
        "/info?url=http%3A%2F%2Fexample.com%2F",
    )
    .await;

    assert_eq!(json_body(&body)["content_length"], -1);
}

#[tokio::test]
async fn get_passes_charset_through() {
    // "Привет" in windows-1251
    let transport = MockTransport::new().on(
        "http://example.ru/",
        200,
        &[],
        vec![0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2],
    );

    let (_, _, body) = send(
        router(transport, ""),
        "GET",
        "/get?url=http%3A%2F%2Fexample.ru%2F&charset=windows-1251",
    )
    .await;

    assert_eq!(json_body(&body)["contents"], "Привет");
}

#[tokio::test]
async fn get_reports_upstream_errors_in_band() {
    let transport = MockTransport::new().on(
        "http://example.com/missing",
        404,
        &[("content-type", "text/plain")],
        "not found",
    );

    let (status, _, body) = send(
        router(transport, ""),
        "GET",
        "/get?url=http%3A%2F%2Fexample.com%2Fmissing",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let value = json_body(&body);
    assert_eq!(value["contents"], "not found");
    assert_eq!(value["status"]["http_code"], 404);
    assert_eq!(value["status"]["content_length"], 9);
}

#[tokio::test]
async fn get_reports_transport_errors_in_band() {
    let transport = MockTransport::new()
        .on_failure("http://down.example.com/", FetchError::Connect("refused".into()));

    let (status, _, body) = send(
        router(transport, ""),
        "GET",
        "/get?url=http%3A%2F%2Fdown.example.com%2F",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let value = json_body(&body);
    assert_eq!(value["contents"], Value::Null);
    assert_eq!(value["status"]["error"], "Connection failed: refused");
}

#[tokio::test]
async fn raw_serves_upstream_bytes() {
    let transport = MockTransport::new().on(
        "http://example.com/logo.png",
        200,
        &[("content-type", "image/png")],
        vec![0x89, b'P', b'N', b'G'],
    );

    let (status, headers, body) = send(
        router(transport, ""),
        "GET",
        "/raw?url=http%3A%2F%2Fexample.com%2Flogo.png",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(body, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn raw_mirrors_upstream_error_status() {
    let transport = MockTransport::new().on("http://example.com/boom", 503, &[], "busy");

    let (status, _, body) = send(
        router(transport, ""),
        "GET",
        "/raw?url=http%3A%2F%2Fexample.com%2Fboom",
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, b"busy");
}

#[tokio::test]
async fn raw_transport_failure_is_bad_gateway() {
    let (status, _, body) = send(
        router(MockTransport::new(), ""),
        "GET",
        "/raw?url=http%3A%2F%2Fnowhere.example.com%2F",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(&body)["contents"], Value::Null);
}

#[tokio::test]
async fn missing_url_is_rejected() {
    let (status, _, _) = send(router(MockTransport::new(), ""), "GET", "/get").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
