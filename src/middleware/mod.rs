//! Middleware layer.
//!
//! A middleware sees every request before its handler and every response
//! after it. The router runs them as an ordered chain:
//!
//! 1. global middleware (registered with [`Router::layer`](crate::Router::layer)),
//!    for matched and unmatched requests alike;
//! 2. group middleware (registered on a [`Group`](crate::router::Group)), only
//!    for the routes of that group;
//! 3. the handler.
//!
//! The first `before` that returns `Some(response)` short-circuits the chain.
//! `after` then runs, in reverse order, for every middleware whose `before` ran.

use std::time::Duration;

use crate::request::Request;
use crate::response::Response;

mod auth;
mod logger;

pub use auth::{ApiKeyAuth, API_KEY_HEADER};
pub use logger::RequestLogger;

/// A request interceptor.
pub trait Middleware: Send + Sync + 'static {
    /// Return `Some` to answer the request here; `None` passes control on.
    fn before(&self, _req: &Request) -> Option<Response> {
        None
    }

    /// Observes the final response. Cannot replace it.
    fn after(&self, _res: &Response, _latency: Duration) {}
}
