//! Error types.
//!
//! Two layers, kept apart:
//!
//! - [`ApiError`] is the request-level taxonomy. Handlers and middleware return
//!   it; its [`IntoResponse`] impl is the single place that maps a failure to a
//!   status code and a `{error, message, details?}` body.
//! - [`Error`] surfaces infrastructure failures: binding a port, accepting a
//!   connection, reading configuration.

use serde::Serialize;
use tracing::{error, warn};

use crate::response::{IntoResponse, Json};
use crate::status::Status;

/// Infrastructure failures returned by [`Server::serve`](crate::Server::serve)
/// and [`Config::from_env`](crate::Config::from_env).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),
}

/// One violated field of a create/update payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_owned(), message: message.into() }
    }
}

/// Every way a catalog request can fail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Validation { message: String, details: Vec<FieldError> },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Anything unclassified. `status` defaults to 500 but may be narrowed by
    /// whoever raised it (e.g. 400 for an unparseable body).
    #[error("{message}")]
    Internal { status: Status, message: String },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::Validation { message: message.into(), details }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { status: Status::InternalServerError, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Internal { status: Status::BadRequest, message: message.into() }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::NotFound(_) => Status::NotFound,
            Self::Validation { .. } => Status::BadRequest,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Forbidden(_) => Status::Forbidden,
            Self::Internal { status, .. } => *status,
        }
    }

    /// Machine-readable kind name sent as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFoundError",
            Self::Validation { .. } => "ValidationError",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::Internal { .. } => "InternalServerError",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> crate::Response {
        let status = self.status();

        // Full detail goes to the log; server faults reach the client only as
        // a generic message.
        let message = if status.is_server_error() {
            error!(kind = self.kind(), status = status.as_u16(), error = %self, "request failed");
            "Internal Server Error".to_owned()
        } else {
            warn!(kind = self.kind(), status = status.as_u16(), error = %self, "request rejected");
            self.to_string()
        };

        let details = match &self {
            Self::Validation { details, .. } => Some(details.as_slice()),
            _ => None,
        };

        let body = ErrorBody { error: self.kind(), message: &message, details };
        let mut res = Json(body).into_response();
        res.status = status;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn body(err: ApiError) -> (Status, Value) {
        let res = err.into_response();
        (res.code(), serde_json::from_slice(res.body()).unwrap())
    }

    #[test]
    fn not_found_has_no_details() {
        let (status, v) = body(ApiError::not_found("Product with id 9 not found"));
        assert_eq!(status, Status::NotFound);
        assert_eq!(v["error"], "NotFoundError");
        assert_eq!(v["message"], "Product with id 9 not found");
        assert!(v.get("details").is_none());
    }

    #[test]
    fn validation_lists_every_field() {
        let err = ApiError::validation(
            "Validation failed",
            vec![FieldError::new("name", "is required"), FieldError::new("price", "must be >= 0")],
        );
        let (status, v) = body(err);
        assert_eq!(status, Status::BadRequest);
        assert_eq!(v["error"], "ValidationError");
        assert_eq!(v["details"].as_array().unwrap().len(), 2);
        assert_eq!(v["details"][1]["field"], "price");
    }

    #[test]
    fn server_faults_hide_their_message() {
        let (status, v) = body(ApiError::internal("lock poisoned at catalog.rs:42"));
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(v["error"], "InternalServerError");
        assert_eq!(v["message"], "Internal Server Error");
    }

    #[test]
    fn attached_client_status_is_kept() {
        let (status, v) = body(ApiError::bad_request("malformed JSON body"));
        assert_eq!(status, Status::BadRequest);
        assert_eq!(v["error"], "InternalServerError");
        assert_eq!(v["message"], "malformed JSON body");
    }
}
