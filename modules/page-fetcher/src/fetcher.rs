// PageFetcher: the public entry point.
//
// mapping -> dispatch -> request -> shape/normalize, one transport call per
// fetch. The mapping table is shared read-only; nothing else is kept between
// calls.

use std::sync::Arc;

use http::Method;
use tracing::{info, warn};
use url::Url;

use crate::charset::Body;
use crate::error::{FetchError, Result};
use crate::mapping::DomainMappings;
use crate::outcome::{FetchOutcome, Page, PageContents, PageInfo, PageStatus, RawPage};
use crate::request::{FetchRequest, Format};
use crate::transport::{
    HttpTransport, ReqwestTransport, TransportFailure, TransportRequest, TransportResponse,
};

/// Which response shape a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shaper {
    Info,
    Raw,
    Contents,
}

impl Shaper {
    /// `HEAD` always gets info, whatever the format. Info/HEAD is checked
    /// before raw.
    pub fn select(format: Format, method: &Method) -> Self {
        if format == Format::Info || *method == Method::HEAD {
            Shaper::Info
        } else if format == Format::Raw {
            Shaper::Raw
        } else {
            Shaper::Contents
        }
    }
}

/// A successful exchange. `content` is `None` for `HEAD`.
struct Fetched {
    response: TransportResponse,
    content: Option<Body>,
}

pub struct PageFetcher<T = ReqwestTransport> {
    mappings: Arc<DomainMappings>,
    transport: T,
}

impl PageFetcher<ReqwestTransport> {
    /// reqwest transport with default options, mappings from `DOMAIN_MAPPINGS`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(DomainMappings::from_env(), ReqwestTransport::new()?))
    }
}

impl<T: HttpTransport> PageFetcher<T> {
    pub fn new(mappings: impl Into<Arc<DomainMappings>>, transport: T) -> Self {
        Self {
            mappings: mappings.into(),
            transport,
        }
    }

    pub fn mappings(&self) -> &DomainMappings {
        &self.mappings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The URL that will actually be requested for `url`.
    pub fn resolve_url(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match self.mappings.remap(&parsed) {
            Some((mapping, mapped)) => {
                let host = parsed.host_str().unwrap_or_default();
                info!(host, mapped_to = %mapping, "Using domain mapping");
                info!(url = %mapped, "Mapped URL");
                Ok(mapped)
            }
            None => Ok(url.to_string()),
        }
    }

    /// Fetch one page. Never fails: every problem is reported inside the
    /// returned outcome.
    pub async fn fetch_page(&self, request: FetchRequest) -> FetchOutcome {
        let url = match self.resolve_url(&request.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Rejected fetch");
                return FetchOutcome::TransportError(e);
            }
        };

        match Shaper::select(request.format, &request.method) {
            Shaper::Info => self.page_info(url).await,
            Shaper::Raw => {
                self.raw_page(url, request.method, request.charset.as_deref())
                    .await
            }
            Shaper::Contents => {
                self.page_contents(url, request.method, request.charset.as_deref())
                    .await
            }
        }
    }

    async fn page_info(&self, url: String) -> FetchOutcome {
        let fetched = match self.request(&url, Method::HEAD, true, None).await {
            Ok(fetched) => fetched,
            Err(failure) => return normalize_failure(failure),
        };

        let response = fetched.response;
        FetchOutcome::Success(Page::Info(PageInfo {
            url,
            content_type: response.content_type(),
            // A zero length reads as unknown, like an absent header.
            content_length: response
                .declared_length()
                .filter(|&n| n != 0)
                .unwrap_or(-1),
            http_code: response.status,
        }))
    }

    async fn raw_page(&self, url: String, method: Method, charset: Option<&str>) -> FetchOutcome {
        let fetched = match self.request(&url, method, false, charset).await {
            Ok(fetched) => fetched,
            Err(failure) => return normalize_failure(failure),
        };

        let content = fetched.content.unwrap_or_default();
        FetchOutcome::Success(Page::Raw(RawPage {
            content_length: content.len(),
            content_type: fetched.response.content_type(),
            content,
        }))
    }

    async fn page_contents(
        &self,
        url: String,
        method: Method,
        charset: Option<&str>,
    ) -> FetchOutcome {
        let fetched = match self.request(&url, method, true, charset).await {
            Ok(fetched) => fetched,
            Err(failure) => return normalize_failure(failure),
        };

        let content = fetched.content.unwrap_or_default();
        let response = fetched.response;
        FetchOutcome::Success(Page::Contents(PageContents {
            status: PageStatus {
                url,
                content_type: response.content_type(),
                content_length: content.len(),
                http_code: response.status,
            },
            contents: content.into_string_lossy(),
        }))
    }

    /// Execute one request and, unless it was `HEAD`, decode the body.
    async fn request(
        &self,
        url: &str,
        method: Method,
        decompress: bool,
        charset: Option<&str>,
    ) -> std::result::Result<Fetched, TransportFailure> {
        let is_head = method == Method::HEAD;
        let response = self
            .transport
            .execute(TransportRequest {
                url: url.to_string(),
                method,
                decompress,
            })
            .await?;

        if is_head {
            return Ok(Fetched {
                response,
                content: None,
            });
        }

        let content = Body::decode_with(response.body.clone(), charset);
        Ok(Fetched {
            response,
            content: Some(content),
        })
    }
}

/// Turn a failed exchange into an outcome. An error status with a response
/// is reported like a contents fetch; anything else is a transport error.
fn normalize_failure(failure: TransportFailure) -> FetchOutcome {
    let Some(response) = failure.response else {
        warn!(kind = failure.error.kind(), error = %failure.error, "Fetch failed without a response");
        return FetchOutcome::TransportError(failure.error);
    };

    warn!(url = %response.url, status = response.status, "Upstream returned an error status");
    FetchOutcome::HttpError(PageContents {
        contents: String::from_utf8_lossy(&response.body).into_owned(),
        status: PageStatus {
            content_type: response.content_type(),
            content_length: response.body.len(),
            http_code: response.status,
            url: response.url,
        },
    })
}
