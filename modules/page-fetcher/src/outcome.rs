// Result shapes returned by `PageFetcher::fetch_page`.
//
// Serialization reproduces the JSON documents clients of the fetch service
// expect: `{url, content_type, content_length, http_code}` for info,
// `{content, contentType, contentLength}` for raw, `{contents, status}` for
// contents and HTTP errors, and `{contents: null, status: {error}}` when no
// response was received.

use serde::{Serialize, Serializer};

use crate::charset::Body;
use crate::error::FetchError;

/// Headers-only view of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// `content-length` header, or `-1` when absent, zero or not a number.
    pub content_length: i64,
    pub http_code: u16,
}

/// Body as received (or charset-decoded), without status metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    pub content: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Byte length of `content`, not the upstream `content-length`.
    pub content_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageStatus {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub content_length: usize,
    pub http_code: u16,
}

/// Body text plus status metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContents {
    pub contents: String,
    pub status: PageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Page {
    Info(PageInfo),
    Raw(RawPage),
    Contents(PageContents),
}

/// Outcome of one fetch.
///
/// A 4xx/5xx answer is `HttpError` in every format and carries the same
/// `{contents, status}` payload a successful contents fetch would. Failures
/// with no response at all are `TransportError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(Page),
    HttpError(PageContents),
    TransportError(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Upstream status code, when a response was received.
    pub fn http_code(&self) -> Option<u16> {
        match self {
            FetchOutcome::Success(Page::Info(info)) => Some(info.http_code),
            FetchOutcome::Success(Page::Contents(page)) | FetchOutcome::HttpError(page) => {
                Some(page.status.http_code)
            }
            FetchOutcome::Success(Page::Raw(_)) | FetchOutcome::TransportError(_) => None,
        }
    }

    pub fn page(&self) -> Option<&Page> {
        match self {
            FetchOutcome::Success(page) => Some(page),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct TransportErrorEnvelope {
    contents: Option<String>,
    status: TransportErrorStatus,
}

#[derive(Serialize)]
struct TransportErrorStatus {
    error: String,
}

impl Serialize for FetchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FetchOutcome::Success(page) => page.serialize(serializer),
            FetchOutcome::HttpError(page) => page.serialize(serializer),
            FetchOutcome::TransportError(error) => TransportErrorEnvelope {
                contents: None,
                status: TransportErrorStatus {
                    error: error.to_string(),
                },
            }
            .serialize(serializer),
        }
    }
}
