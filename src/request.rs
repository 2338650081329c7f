//! Request descriptors.
//!
//! A [`Request`] captures everything about an API call except the base
//! address and credentials, which the client supplies at dispatch. Builders
//! are infallible; a payload that cannot be encoded surfaces as an error
//! when the request is executed.

use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::document::{self, Resource};
use crate::error::Result;

/// Description of a single API call.
///
/// ```rust,no_run
/// use capstan_api::Request;
///
/// let request = Request::get("/api/v2/organizations")
///     .query("page[size]", "20");
/// # let _ = request;
/// ```
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Option<HeaderMap>,
    pub(crate) raw_body: Option<Vec<u8>>,
    pub(crate) document: Option<Result<Vec<u8>>>,
}

impl Request {
    /// Create a descriptor for the given method and endpoint path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: None,
            raw_body: None,
            document: None,
        }
    }

    /// Create a GET descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST descriptor.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PATCH descriptor.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Create a DELETE descriptor.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter. Keys and values are percent-encoded at
    /// dispatch.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Replace the request headers wholesale.
    ///
    /// `Authorization` is still overwritten at dispatch, and `Content-Type`
    /// is filled in only when absent.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Attach a raw request body, sent as-is.
    ///
    /// Ignored when a [`payload`](Self::payload) is also set.
    pub fn raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.raw_body = Some(body.into());
        self
    }

    /// Attach a resource payload, encoded as a document envelope.
    ///
    /// Takes precedence over [`raw_body`](Self::raw_body).
    pub fn payload<T: Resource>(mut self, value: &T) -> Self {
        self.document = Some(document::marshal(value));
        self
    }
}
