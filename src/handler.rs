//! Handler trait and type erasure.
//!
//! The router keeps handlers of different concrete types in one matchit tree
//! per method, so each is stored behind `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! async fn list(catalog, req) -> Result<Json<Page>, ApiError>
//!        ↓ handler::with_state(catalog, list)
//! move |req| list(Arc::clone(&catalog), req)        ← still a Handler
//!        ↓ into_boxed_handler()
//! Arc<FnHandler<_>>  stored as BoxedHandler
//!        ↓ handler.call(req)
//! Box::pin(async { list(..).await.into_response() })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler: any
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>`.
///
/// Sealed; the blanket impl below is the only one.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Binds shared state to a two-argument handler, yielding a [`Handler`].
///
/// Each request gets its own `Arc` clone of `state`; nothing outlives the
/// request but the `Arc` itself.
pub fn with_state<S, F, Fut, R>(state: Arc<S>, f: F) -> impl Handler
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| f(Arc::clone(&state), req)
}
