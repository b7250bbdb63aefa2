//! Shared-secret admission check.

use super::Middleware;
use crate::error::ApiError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Header that carries the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Admits a request only when its `x-api-key` header equals the configured
/// secret.
///
/// | header | outcome |
/// |---|---|
/// | missing or empty | `401 Unauthorized` |
/// | present, wrong | `403 Forbidden` |
/// | present, equal | passes through untouched |
#[derive(Clone, Debug)]
pub struct ApiKeyAuth {
    secret: String,
}

impl ApiKeyAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// The admission decision on its own, without building a response.
    pub fn check(&self, req: &Request) -> Result<(), ApiError> {
        match req.header(API_KEY_HEADER) {
            None | Some("") => Err(ApiError::Unauthorized(format!(
                "API key is required in {API_KEY_HEADER} header"
            ))),
            Some(key) if key != self.secret => Err(ApiError::Forbidden("Invalid API key".to_owned())),
            Some(_) => Ok(()),
        }
    }
}

impl Middleware for ApiKeyAuth {
    fn before(&self, req: &Request) -> Option<Response> {
        self.check(req).err().map(IntoResponse::into_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, Status};

    fn request(key: Option<&str>) -> Request {
        let b = Request::builder(Method::Get, "/api/products");
        match key {
            Some(k) => b.header("X-API-Key", k).build(),
            None => b.build(),
        }
    }

    #[test]
    fn missing_key_is_unauthorized() {
        let auth = ApiKeyAuth::new("s3cret");
        let res = auth.before(&request(None)).unwrap();
        assert_eq!(res.code(), Status::Unauthorized);
        let res = auth.before(&request(Some(""))).unwrap();
        assert_eq!(res.code(), Status::Unauthorized);
    }

    #[test]
    fn wrong_key_is_forbidden() {
        let auth = ApiKeyAuth::new("s3cret");
        let res = auth.before(&request(Some("guess"))).unwrap();
        assert_eq!(res.code(), Status::Forbidden);
        let v: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(v["error"], "Forbidden");
        assert_eq!(v["message"], "Invalid API key");
    }

    #[test]
    fn non_ascii_key_is_forbidden_not_missing() {
        let (parts, ()) = http::Request::builder()
            .uri("/api/products")
            .header(API_KEY_HEADER, http::HeaderValue::from_bytes(b"caf\xe9").unwrap())
            .body(())
            .unwrap()
            .into_parts();
        let req = Request::from_parts(parts, bytes::Bytes::new());
        let res = ApiKeyAuth::new("s3cret").before(&req).unwrap();
        assert_eq!(res.code(), Status::Forbidden);
    }

    #[test]
    fn correct_key_passes() {
        let auth = ApiKeyAuth::new("s3cret");
        assert!(auth.before(&request(Some("s3cret"))).is_none());
        assert!(auth.check(&request(Some("s3cret"))).is_ok());
    }
}
