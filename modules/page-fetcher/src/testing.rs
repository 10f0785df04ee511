// Test mocks for the fetch pipeline.
//
// MockTransport answers from a URL -> canned response map and records every
// request it sees, so tests can assert on the effective URL, the method and
// whether decompression was asked for.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};

use crate::error::FetchError;
use crate::transport::{
    check_status, HttpTransport, TransportFailure, TransportRequest, TransportResponse,
};

enum MockRoute {
    Respond {
        status: u16,
        headers: HeaderMap,
        body: Bytes,
    },
    Fail(FetchError),
}

/// HashMap-based transport. Unregistered URLs fail with a connect error.
/// Builder pattern: `.on()`, `.on_failure()`.
pub struct MockTransport {
    routes: HashMap<String, MockRoute>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer `url` with the given status, headers and body. Status >= 400 is
    /// reported the same way `ReqwestTransport` reports it.
    pub fn on(
        mut self,
        url: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(
                HeaderName::try_from(*name).expect("valid header name"),
                HeaderValue::try_from(*value).expect("valid header value"),
            );
        }
        self.routes.insert(
            url.to_string(),
            MockRoute::Respond {
                status,
                headers: map,
                body: body.into(),
            },
        );
        self
    }

    /// Fail `url` before any response is received.
    pub fn on_failure(mut self, url: &str, error: FetchError) -> Self {
        self.routes.insert(url.to_string(), MockRoute::Fail(error));
        self
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request.clone());

        match self.routes.get(&request.url) {
            Some(MockRoute::Respond {
                status,
                headers,
                body,
            }) => {
                let body = if request.method == Method::HEAD {
                    Bytes::new()
                } else {
                    body.clone()
                };
                check_status(TransportResponse {
                    url: request.url.clone(),
                    status: *status,
                    headers: headers.clone(),
                    body,
                })
            }
            Some(MockRoute::Fail(error)) => Err(TransportFailure::without_response(error.clone())),
            None => Err(TransportFailure::without_response(FetchError::Connect(
                format!("MockTransport: no response registered for {}", request.url),
            ))),
        }
    }
}
