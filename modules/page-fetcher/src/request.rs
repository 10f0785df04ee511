use http::Method;
use typed_builder::TypedBuilder;

/// Which shape the caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Status line and headers only, fetched with `HEAD`.
    Info,
    /// Body exactly as transmitted, no decompression.
    Raw,
    /// Decompressed body as text plus status metadata.
    #[default]
    Contents,
}

impl Format {
    /// `"info"` and `"raw"` select those formats; anything else is `Contents`.
    pub fn from_param(param: &str) -> Self {
        match param {
            "info" => Format::Info,
            "raw" => Format::Raw,
            _ => Format::Contents,
        }
    }
}

/// One page fetch, as asked for by a caller.
#[derive(Debug, Clone, TypedBuilder)]
pub struct FetchRequest {
    #[builder(setter(into))]
    pub url: String,
    #[builder(default)]
    pub format: Format,
    #[builder(default = Method::GET)]
    pub method: Method,
    /// Encoding label used to decode the body, e.g. `windows-1251`.
    #[builder(default, setter(into))]
    pub charset: Option<String>,
}
