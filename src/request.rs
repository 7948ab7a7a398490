//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;
use http_body_util::combinators::BoxBody;
use serde_json::Value;

use crate::context::Context;
use crate::multipart::{FormFile, MultipartError, MultipartForm};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

static EMPTY: Bytes = Bytes::new();

/// Request payload: collected up front, or left on the wire for
/// [`MultipartForm`] to stream.
pub(crate) enum Body {
    Buffered(Bytes),
    Streaming(BoxBody<Bytes, BoxError>),
}

/// An incoming HTTP request.
///
/// Built by the server from a hyper request, or directly from an
/// `http::Request<Bytes>` (see the `From` impl) when driving a
/// [`Router`](crate::Router) in-process.
pub struct Request {
    pub(crate) method: http::Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
    pub(crate) params: HashMap<String, String>,
    pub(crate) context: Context,
}

impl Request {
    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// The collected body.
    ///
    /// The server does not collect `multipart/form-data` bodies; they stay
    /// unread until [`Request::multipart_form`] streams them, and this returns
    /// an empty buffer for them.
    pub fn body(&self) -> &Bytes {
        match &self.body {
            Body::Buffered(b) => b,
            Body::Streaming(_) => &EMPTY,
        }
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/files/{name}`, `req.param("name")` on `/files/a.txt`
    /// returns `Some("a.txt")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn context(&self) -> &Context { &self.context }
    pub fn context_mut(&mut self) -> &mut Context { &mut self.context }

    /// Stores a request-scoped annotation. See [`Context::set`].
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.set(key, value);
    }

    /// Reads a request-scoped annotation. See [`Context::lookup`].
    pub fn lookup(&self, key: &str) -> (Value, bool) {
        self.context.lookup(key)
    }

    /// Parses the body as `multipart/form-data`, keeping at most `max_memory`
    /// bytes of file content in memory. Consumes the body.
    pub async fn multipart_form(&mut self, max_memory: u64) -> Result<MultipartForm, MultipartError> {
        MultipartForm::parse(self, max_memory).await
    }

    /// Parses the multipart body and returns the first file sent under `field`.
    pub async fn form_file(&mut self, field: &str, max_memory: u64) -> Result<FormFile, MultipartError> {
        let mut form = self.multipart_form(max_memory).await?;
        form.take_file(field)
            .ok_or_else(|| MultipartError::MissingFile(field.to_owned()))
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Body) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            params: HashMap::new(),
            context: Context::new(),
        }
    }

    /// Takes the payload out, leaving an empty buffer behind.
    pub(crate) fn take_body(&mut self) -> Body {
        std::mem::replace(&mut self.body, Body::Buffered(Bytes::new()))
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, Body::Buffered(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request {
        http::Request::builder()
            .uri(uri)
            .header("Content-Type", "text/plain")
            .body(Bytes::from_static(b"hi"))
            .unwrap()
            .into()
    }

    #[test]
    fn splits_path_and_query() {
        let req = request("/upload?dry=1");
        assert_eq!(req.path(), "/upload");
        assert_eq!(req.query(), Some("dry=1"));
        assert_eq!(req.body().as_ref(), b"hi");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = request("/");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn streaming_body_reads_as_empty() {
        use http_body_util::{BodyExt, Full};

        let (parts, _) = http::Request::builder().uri("/upload").body(()).unwrap().into_parts();
        let body = Full::new(Bytes::from_static(b"payload"))
            .map_err(|never| -> BoxError { match never {} })
            .boxed();
        let mut req = Request::from_parts(parts, Body::Streaming(body));

        assert!(req.body().is_empty());
        assert!(matches!(req.take_body(), Body::Streaming(_)));
        assert!(matches!(req.take_body(), Body::Buffered(b) if b.is_empty()));
    }

    #[test]
    fn annotations_round_through_context() {
        let mut req = request("/");
        assert!(!req.lookup("request").1);
        req.set("request", "中间件");
        assert_eq!(req.context().get_str("request"), Some("中间件"));
    }
}
