//! Fetch a single web page, optionally through a hostname -> IP mapping and a
//! named charset, and report it as headers only, raw bytes, or text.
//!
//! ```ignore
//! let fetcher = PageFetcher::new(DomainMappings::parse("a.example.com:10.0.0.5:8080"), ReqwestTransport::new()?);
//! let outcome = fetcher
//!     .fetch_page(FetchRequest::builder().url("http://a.example.com/foo?x=1").build())
//!     .await;
//! ```

pub mod charset;
pub mod error;
pub mod fetcher;
pub mod mapping;
pub mod outcome;
pub mod request;
pub mod transport;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use charset::{decode, encoding_exists, Body};
pub use error::{FetchError, Result};
pub use fetcher::{PageFetcher, Shaper};
pub use mapping::{DomainMappings, HostMapping, DOMAIN_MAPPINGS_ENV};
pub use outcome::{FetchOutcome, Page, PageContents, PageInfo, PageStatus, RawPage};
pub use request::{FetchRequest, Format};
pub use transport::{
    HttpTransport, ReqwestTransport, TransportFailure, TransportOptions, TransportRequest,
    TransportResponse, DEFAULT_USER_AGENT,
};

pub use http::Method;
