//! HTTP status codes as a typed enum.
//!
//! Only the codes the catalog actually emits are named. Use [`Status`]
//! anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or inside an [`ApiError`](crate::ApiError).
//!
//! ```rust
//! use catalog::{Response, Status};
//!
//! Response::status(Status::NotFound);
//!
//! Response::builder()
//!     .status(Status::Created)
//!     .header("location", "/api/products/42")
//!     .json(br#"{"id":"42"}"#.to_vec());
//! ```

/// The status codes produced by the catalog service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    Created,             // 201

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    Unauthorized,        // 401
    Forbidden,           // 403
    NotFound,            // 404

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl Status {
    pub fn as_u16(self) -> u16 {
        self.into()
    }

    pub fn is_server_error(self) -> bool {
        self.as_u16() >= 500
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Created             => 201,
            Status::BadRequest          => 400,
            Status::Unauthorized        => 401,
            Status::Forbidden           => 403,
            Status::NotFound            => 404,
            Status::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        // Every variant above is a registered code.
        http::StatusCode::from_u16(s.as_u16()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
