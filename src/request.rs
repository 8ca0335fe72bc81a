//! Incoming HTTP request type.

use http::header::HeaderName;
use http::{HeaderMap, HeaderValue, Method, Uri};

use crate::context::Context;

/// An incoming HTTP request plus its request-scoped [`Context`].
///
/// The body is not read: the service only answers `GET`.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) context: Context,
}

impl Request {
    /// Builds a request with an empty root context.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self { method, uri, headers, context: Context::new() }
    }

    pub(crate) fn from_parts(parts: http::request::Parts) -> Self {
        Self::new(parts.method, parts.uri, parts.headers)
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn context(&self) -> &Context { &self.context }

    /// Path plus query, as the client sent it (e.g. `/?name=Ada`).
    pub fn request_uri(&self) -> &str {
        self.uri
            .path_and_query()
            .map_or_else(|| self.uri.path(), |pq| pq.as_str())
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Overwrites a header for the rest of the pipeline.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Looks up one query parameter, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Replaces the context, typically with one derived from the current one.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }
}
