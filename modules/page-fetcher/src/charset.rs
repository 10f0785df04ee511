// Named-charset decoding for response bodies.

use bytes::Bytes;
use encoding_rs::Encoding;
use serde::{Serialize, Serializer};

/// Whether `label` names an encoding we can decode (WHATWG labels,
/// case-insensitive, surrounding whitespace ignored).
pub fn encoding_exists(label: &str) -> bool {
    Encoding::for_label(label.as_bytes()).is_some()
}

/// Decode `bytes` with the encoding named by `label`. Malformed sequences
/// become U+FFFD. A leading BOM is not sniffed; the named encoding wins.
pub fn decode(bytes: &[u8], label: &str) -> Option<String> {
    let encoding = Encoding::for_label(label.as_bytes())?;
    let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
    Some(text.into_owned())
}

/// A buffered response body, either as received or decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Bytes(Bytes),
    Text(String),
}

impl Body {
    /// Decode `bytes` when `charset` names a known encoding, otherwise keep
    /// them untouched.
    pub fn decode_with(bytes: Bytes, charset: Option<&str>) -> Self {
        match charset.and_then(|label| decode(&bytes, label)) {
            Some(text) => Body::Text(text),
            None => Body::Bytes(bytes),
        }
    }

    /// Byte length of the body as it would be written out (UTF-8 for text).
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Bytes(bytes) => bytes,
            Body::Text(text) => text.as_bytes(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Body::Text(_))
    }

    /// Text view; undecoded bytes are read as UTF-8, lossily.
    pub fn into_string_lossy(self) -> String {
        match self {
            Body::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Body::Text(text) => text,
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Body::Bytes(bytes) => bytes,
            Body::Text(text) => Bytes::from(text),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Bytes(Bytes::new())
    }
}

/// Undecoded bytes keep every byte: `{"type": "Buffer", "data": [..]}`.
#[derive(Serialize)]
struct BufferJson<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a [u8],
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Body::Text(text) => serializer.serialize_str(text),
            Body::Bytes(bytes) => BufferJson {
                kind: "Buffer",
                data: bytes,
            }
            .serialize(serializer),
        }
    }
}
