//! Request logging.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Logs method, path and arrival time of every request, and the status and
/// latency of its response. Never answers a request itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn before(&self, req: &Request) -> Option<Response> {
        info!(
            method = req.method(),
            path = req.path(),
            at = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "request received"
        );
        None
    }

    fn after(&self, res: &Response, latency: Duration) {
        info!(
            status = res.code().as_u16(),
            latency_us = latency.as_micros() as u64,
            "response sent"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn never_short_circuits() {
        let req = Request::builder(Method::Delete, "/anything").build();
        assert!(RequestLogger.before(&req).is_none());
    }
}
