//! Request and response model consumed by the router and the dispatcher.
//!
//! # Responsibilities
//! - Carry the HTTP method and URI used for matching
//! - Carry key-value attributes that middleware passes forward
//! - Collect response status, headers and an appendable body
//!
//! # Design Decisions
//! - Built on `axum::http` types so hosts can convert at the edges
//! - Requests are rebuilt, not mutated in place (`with_*` consume `self`)
//! - Methods parse case-insensitively: `gEt` is `GET`

use std::borrow::Cow;
use std::collections::HashMap;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use serde_json::Value;

use crate::error::{Error, Result};

/// Uppercases extension methods so `gEt` and `GET` compare equal
pub fn normalize_method(method: Method) -> Method {
    let upper = method.as_str().to_ascii_uppercase();
    if upper == method.as_str() {
        return method;
    }
    match Method::from_bytes(upper.as_bytes()) {
        Ok(normalized) => normalized,
        Err(_) => method,
    }
}

/// Parses a method name case-insensitively
pub fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| Error::InvalidMethod(method.to_string()))
}

/// An incoming request as seen by the routing core
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    attributes: HashMap<String, Value>,
}

impl Request {
    /// Creates a request from a method name and a percent-encoded URI
    ///
    /// An empty URI is treated as `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard_router::Request;
    ///
    /// let request = Request::new("get", "/albums?q=Symbolic").unwrap();
    /// assert_eq!(request.method().as_str(), "GET");
    /// assert_eq!(request.path(), "/albums");
    /// ```
    pub fn new(method: impl AsRef<str>, uri: impl AsRef<str>) -> Result<Self> {
        let method = parse_method(method.as_ref())?;
        let raw = match uri.as_ref() {
            "" => "/",
            other => other,
        };
        let uri = raw.parse::<Uri>().map_err(|e| Error::InvalidUri {
            uri: raw.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            method,
            uri,
            headers: HeaderMap::new(),
            attributes: HashMap::new(),
        })
    }

    /// Adapts an `http::Request`, keeping method, URI and headers
    pub fn from_http<B>(request: &axum::http::Request<B>) -> Self {
        Self {
            method: normalize_method(request.method().clone()),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            attributes: HashMap::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Percent-encoded path, without the query string
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a request with the header set; invalid names or values are skipped
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        insert_header(&mut self.headers, name.as_ref(), value.as_ref());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String value of an attribute, if it holds one
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Returns a request carrying the additional attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A response produced by a view, a middleware or an after-handler
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a `200 OK` response with a content type and body
    pub fn with_body(content_type: &str, body: impl AsRef<[u8]>) -> Self {
        let mut response = Self::new().with_header(header::CONTENT_TYPE.as_str(), content_type);
        response.write(body);
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Sets a header, replacing earlier values; invalid names or values are skipped
    pub fn set_header(&mut self, name: &str, value: &str) {
        insert_header(&mut self.headers, name, value);
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.set_header(name.as_ref(), value.as_ref());
        self
    }

    /// Appends to the body
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8 (lossy)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// What a view hands back to the pipeline
#[derive(Debug, Clone)]
pub enum Reply {
    /// A finished response; after-handlers and renderers are skipped
    Response(Response),
    /// Arbitrary data still to be turned into a response
    Data(Value),
}

impl Reply {
    /// Wraps any JSON-convertible value as data
    pub fn data(value: impl Into<Value>) -> Self {
        Reply::Data(value.into())
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Reply::Response(_))
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Data(value)
    }
}

fn insert_header(headers: &mut HeaderMap, key: &str, value: &str) {
    if let (Ok(name), Ok(val)) = (
        HeaderName::from_bytes(key.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        headers.insert(name, val);
    }
}
