//! # catalog
//!
//! A product catalog served over REST from an in-memory store.
//!
//! Every request runs through one pipeline:
//!
//! ```text
//! RequestLogger ─▶ ApiKeyAuth (only /api/products*) ─▶ handler ─▶ response
//!                        │                               │
//!                        └──── ApiError ◀────────────────┘  (single responder)
//! ```
//!
//! - [`Catalog`] owns the products and answers list/search/stats/get and
//!   create/update/delete.
//! - [`validation::validate`] turns a JSON payload into a trusted
//!   [`ProductDraft`], reporting every bad field at once.
//! - [`ApiError`] is the failure taxonomy; it renders as
//!   `{error, message, details?}` with the matching status.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog::{routes, Catalog, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = routes::app(Arc::new(Catalog::seeded()), "secret");
//!     Server::bind("127.0.0.1:3000".parse().unwrap()).serve(app).await.unwrap();
//! }
//! ```
//!
//! ## Driving the router without a socket
//!
//! ```rust
//! use std::sync::Arc;
//! use catalog::{routes, Catalog, Method, Request, Status};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = routes::app(Arc::new(Catalog::seeded()), "secret");
//! let res = app
//!     .dispatch(Request::builder(Method::Get, "/api/products/1").header("x-api-key", "secret").build())
//!     .await;
//! assert_eq!(res.code(), Status::Ok);
//! # }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod server;
mod status;

pub mod catalog;
pub mod config;
pub mod middleware;
pub mod product;
pub mod query;
pub mod router;
pub mod routes;
pub mod validation;

pub use catalog::{Catalog, CatalogStats, PriceStats};
pub use config::Config;
pub use error::{ApiError, Error, FieldError};
pub use handler::{Handler, with_state};
pub use method::Method;
pub use product::{Product, ProductDraft};
pub use query::{ListQuery, Page, Pagination};
pub use request::{Request, RequestBuilder};
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
