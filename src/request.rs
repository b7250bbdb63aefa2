//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::method::Method;

/// An incoming HTTP request with its body already collected.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) query_params: HashMap<String, String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        let headers = parts.headers.iter()
            .map(|(k, v)| (k.as_str().to_owned(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();

        Self::assemble(
            parts.method.as_str().to_owned(),
            parts.uri.path().to_owned(),
            parts.uri.query().map(str::to_owned),
            headers,
            body,
        )
    }

    fn assemble(
        method: String,
        path: String,
        query: Option<String>,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        let query_params = query.as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self { method, path, query, query_params, headers, body, params: HashMap::new() }
    }

    /// Builds a request without a socket. `target` may carry a query string.
    ///
    /// ```rust
    /// use catalog::{Method, Request};
    ///
    /// let req = Request::builder(Method::Get, "/api/products?page=2")
    ///     .header("x-api-key", "secret")
    ///     .build();
    /// assert_eq!(req.query("page"), Some("2"));
    /// ```
    pub fn builder(method: Method, target: &str) -> RequestBuilder {
        RequestBuilder {
            method,
            target: target.to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Path plus query string, as the client sent it.
    pub fn target(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/products/{id}`, `req.param("id")` on
    /// `/api/products/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a decoded query parameter. Repeated keys keep the last value.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_params.get(key).map(String::as_str)
    }

    /// Decodes the JSON body.
    ///
    /// The body is only parsed when `content-type` is `application/json` or a
    /// `+json` type. Anything else, including an empty body, decodes as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let bytes: &[u8] = if self.body.is_empty() || !self.is_json() { b"{}" } else { &self.body };
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::bad_request(format!("malformed JSON body: {e}")))
    }

    fn is_json(&self) -> bool {
        let Some(content_type) = self.header("content-type") else {
            return false;
        };
        let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        essence == "application/json"
            || essence.split_once('/').is_some_and(|(_, sub)| sub.ends_with("+json"))
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }
}

/// Fluent builder for [`Request`]. Obtain via [`Request::builder`].
pub struct RequestBuilder {
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl RequestBuilder {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialises `value` as the body and sets `content-type`.
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.header("content-type", "application/json")
            .body(value.to_string())
    }

    pub fn build(self) -> Request {
        let (path, query) = match self.target.split_once('?') {
            Some((p, q)) => (p.to_owned(), Some(q.to_owned())),
            None => (self.target, None),
        };
        Request::assemble(self.method.as_str().to_owned(), path, query, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_percent_decoded() {
        let req = Request::builder(Method::Get, "/api/products/search?q=coffee%20maker&x=")
            .build();
        assert_eq!(req.path(), "/api/products/search");
        assert_eq!(req.query("q"), Some("coffee maker"));
        assert_eq!(req.query("x"), Some(""));
        assert_eq!(req.query("missing"), None);
        assert_eq!(req.target(), "/api/products/search?q=coffee%20maker&x=");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::builder(Method::Get, "/").header("X-Api-Key", "k").build();
        assert_eq!(req.header("x-api-key"), Some("k"));
    }

    #[test]
    fn empty_body_decodes_as_empty_object() {
        let req = Request::builder(Method::Post, "/api/products").build();
        let v: serde_json::Value = req.json().unwrap();
        assert_eq!(v, serde_json::json!({}));
    }

    #[test]
    fn malformed_body_is_a_client_error() {
        let req = Request::builder(Method::Post, "/api/products")
            .header("Content-Type", "application/json; charset=utf-8")
            .body("{not json")
            .build();
        let err = req.json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.status(), crate::Status::BadRequest);
    }

    #[test]
    fn non_json_content_type_decodes_as_empty_object() {
        for content_type in [None, Some("text/plain"), Some("application/x-www-form-urlencoded")] {
            let mut b = Request::builder(Method::Post, "/api/products").body(r#"{"name":"Kettle"}"#);
            if let Some(ct) = content_type {
                b = b.header("content-type", ct);
            }
            let v: serde_json::Value = b.build().json().unwrap();
            assert_eq!(v, serde_json::json!({}), "{content_type:?}");
        }
    }

    #[test]
    fn vendor_json_types_are_parsed() {
        let req = Request::builder(Method::Post, "/api/products")
            .header("content-type", "Application/Merge-Patch+JSON")
            .body(r#"{"name":"Kettle"}"#)
            .build();
        let v: serde_json::Value = req.json().unwrap();
        assert_eq!(v["name"], "Kettle");
    }
}
