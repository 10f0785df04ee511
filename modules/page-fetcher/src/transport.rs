// Transport boundary: a single buffered HTTP exchange.
//
// PageFetcher only talks to `HttpTransport`. Production wires in
// `ReqwestTransport`; tests use `testing::MockTransport`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AsHeaderName, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Method};
use tracing::debug;

use crate::error::{FetchError, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("page-fetcher/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
    /// `false` asks for the body exactly as sent on the wire.
    pub decompress: bool,
}

/// A fully buffered response. `body` is empty for `HEAD`.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Final URL, after any redirects.
    pub url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// Header value as a string, if present and visible ASCII.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn content_type(&self) -> Option<String> {
        self.header(CONTENT_TYPE)
    }

    /// Numeric `content-length` header, if any.
    pub fn declared_length(&self) -> Option<i64> {
        self.header(CONTENT_LENGTH)?.trim().parse().ok()
    }

    pub fn is_http_error(&self) -> bool {
        self.status >= 400
    }
}

/// A failed exchange. `response` is set when the server did answer but with
/// an error status; it is `None` when nothing usable came back.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub error: FetchError,
    pub response: Option<TransportResponse>,
}

impl TransportFailure {
    pub fn without_response(error: FetchError) -> Self {
        Self {
            error,
            response: None,
        }
    }

    pub fn with_response(response: TransportResponse) -> Self {
        Self {
            error: FetchError::HttpStatus {
                status: response.status,
            },
            response: Some(response),
        }
    }
}

impl From<FetchError> for TransportFailure {
    fn from(error: FetchError) -> Self {
        Self::without_response(error)
    }
}

/// Classify a received response: 4xx and 5xx become failures that still
/// carry the response.
pub fn check_status(
    response: TransportResponse,
) -> std::result::Result<TransportResponse, TransportFailure> {
    if response.is_http_error() {
        Err(TransportFailure::with_response(response))
    } else {
        Ok(response)
    }
}

/// Performs one HTTP request. Implementations must not panic on network
/// failure; every outcome is either a response or a `TransportFailure`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportFailure>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportFailure> {
        (**self).execute(request).await
    }
}

#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub user_agent: String,
    /// Whole-request timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            system_proxy: true,
        }
    }
}

/// reqwest-backed transport. Holds one client that transparently
/// decompresses gzip/brotli/deflate bodies and one that never does.
pub struct ReqwestTransport {
    decompressing: reqwest::Client,
    raw: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_options(TransportOptions::default())
    }

    pub fn with_options(options: TransportOptions) -> Result<Self> {
        Ok(Self {
            decompressing: build_client(&options, true)?,
            raw: build_client(&options, false)?,
        })
    }
}

fn build_client(options: &TransportOptions, decompress: bool) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(options.user_agent.as_str())
        .gzip(decompress)
        .brotli(decompress)
        .deflate(decompress);
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    if !options.system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportFailure> {
        let client = if request.decompress {
            &self.decompressing
        } else {
            &self.raw
        };
        let is_head = request.method == Method::HEAD;

        let resp = client
            .request(request.method, &request.url)
            .send()
            .await
            .map_err(FetchError::from)?;

        let url = resp.url().to_string();
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();

        // Note: no streaming, the whole body is buffered
        let body = if is_head {
            Bytes::new()
        } else {
            resp.bytes().await.map_err(FetchError::from)?
        };

        debug!(url = %url, status, bytes = body.len(), decompress = request.decompress, "Fetched");

        check_status(TransportResponse {
            url,
            status,
            headers,
            body,
        })
    }
}
