//! Correlation identifiers.

use std::fmt;
use std::sync::Arc;

use http::HeaderValue;
use http::header::HeaderName;
use uuid::Uuid;

/// Header carrying the correlation id, in both directions.
pub const CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Opaque identifier tying together every log record of one request.
///
/// Backed by `Arc<str>`: it is cloned into the context, the logger and the
/// response header, and never changes after it is resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Generates a fresh id from a UUID v4 (122 random bits).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// Takes a caller-supplied header value verbatim, including non-ASCII
    /// UTF-8. Empty values, and byte strings that are not UTF-8, are treated
    /// as absent.
    pub fn from_header(value: Option<&HeaderValue>) -> Option<Self> {
        let raw = std::str::from_utf8(value?.as_bytes()).ok()?;
        if raw.is_empty() {
            return None;
        }
        Some(Self(raw.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a header value.
    ///
    /// Ids are either UUIDs or were read from a header in the first place, so
    /// conversion cannot fail for ids this crate produces.
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_bytes(self.0.as_bytes()).ok()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_is_a_uuid() {
        let id = CorrelationId::generate();
        assert_eq!(id.as_str().len(), 36);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_generate_uniqueness() {
        let ids: HashSet<_> = (0..10_000).map(|_| CorrelationId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_from_header_keeps_value_verbatim() {
        let value = HeaderValue::from_static("  Caller-Id_42  ");
        let id = CorrelationId::from_header(Some(&value)).unwrap();
        assert_eq!(id.as_str(), "  Caller-Id_42  ");
    }

    #[test]
    fn test_from_header_accepts_non_ascii_utf8() {
        let value = HeaderValue::from_bytes("trace-café".as_bytes()).unwrap();
        let id = CorrelationId::from_header(Some(&value)).unwrap();

        assert_eq!(id.as_str(), "trace-café");
        assert_eq!(id.to_header_value().unwrap().as_bytes(), "trace-café".as_bytes());
    }

    #[test]
    fn test_from_header_rejects_invalid_utf8() {
        let value = HeaderValue::from_bytes(b"trace-\xff").unwrap();
        assert_eq!(CorrelationId::from_header(Some(&value)), None);
    }

    #[test]
    fn test_from_header_treats_empty_as_absent() {
        let empty = HeaderValue::from_static("");
        assert_eq!(CorrelationId::from_header(Some(&empty)), None);
        assert_eq!(CorrelationId::from_header(None), None);
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let mut headers = http::HeaderMap::new();
        headers.insert("X-Correlation-Id", HeaderValue::from_static("abc"));
        assert_eq!(headers.get(CORRELATION_HEADER).unwrap(), "abc");
    }
}
