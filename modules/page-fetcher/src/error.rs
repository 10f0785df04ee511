use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Why a fetch produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Upstream returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    /// Short machine-readable label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::Timeout(_) => "timeout",
            FetchError::Connect(_) => "connect",
            FetchError::Body(_) => "body",
            FetchError::HttpStatus { .. } => "http_status",
            FetchError::Network(_) => "network",
            FetchError::Client(_) => "client",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return match err.url() {
                Some(url) => FetchError::InvalidUrl {
                    url: url.to_string(),
                    message: err.to_string(),
                },
                None => FetchError::Client(err.to_string()),
            };
        }
        if err.is_timeout() {
            return FetchError::Timeout(err.to_string());
        }
        if err.is_connect() {
            return FetchError::Connect(err.to_string());
        }
        if err.is_body() || err.is_decode() {
            return FetchError::Body(err.to_string());
        }
        if let Some(status) = err.status() {
            return FetchError::HttpStatus {
                status: status.as_u16(),
            };
        }
        FetchError::Network(err.to_string())
    }
}
