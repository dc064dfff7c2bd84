//! Typed request and response values passed through the handler chain.

use crate::routing::{allow_header_value, PathParams};
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

/// A request after routing: method, path, bound parameters and raw body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Request method
    pub method: Method,
    /// Request path, without query string
    pub path: String,
    /// Parameters bound by the matched route
    pub params: PathParams,
    /// Raw request body
    pub body: Bytes,
}

impl ApiRequest {
    /// Build a request with no parameters and an empty body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: PathParams::default(),
            body: Bytes::new(),
        }
    }

    /// Replace the bound parameters
    pub fn with_params(mut self, params: PathParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// A response produced by a handler
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body, possibly empty
    pub body: Bytes,
}

impl ApiResponse {
    /// A response with no body
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A JSON response from an already-encoded body
    pub fn json(status: StatusCode, body: Bytes) -> Self {
        Self::empty(status)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body)
    }

    /// A plain-text response
    pub fn text(status: StatusCode, body: &'static str) -> Self {
        Self::empty(status)
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(Bytes::from_static(body.as_bytes()))
    }

    /// 404 with an empty body
    pub fn not_found() -> Self {
        Self::empty(StatusCode::NOT_FOUND)
    }

    /// 405 listing the methods the path does accept
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        Self::empty(StatusCode::METHOD_NOT_ALLOWED).with_allow(allowed)
    }

    /// 204 answer to an OPTIONS request
    pub fn options(allowed: &[Method]) -> Self {
        Self::empty(StatusCode::NO_CONTENT).with_allow(allowed)
    }

    /// Set a header, replacing any previous value
    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace the body
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    fn with_allow(self, allowed: &[Method]) -> Self {
        match HeaderValue::from_str(&allow_header_value(allowed)) {
            Ok(value) => self.with_header(header::ALLOW, value),
            Err(_) => self,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
