//! Radix-tree request router and the per-request pipeline.
//!
//! One matchit tree per HTTP method. Static segments win over parameters, so
//! `/api/products/search` is matched before `/api/products/{id}`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use matchit::Router as MatchitRouter;
use serde_json::json;
use tracing::{Instrument, debug, info_span};

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

type Chain = Arc<[Arc<dyn Middleware>]>;

struct Route {
    handler: BoxedHandler,
    middleware: Chain,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or drive it directly with [`Router::dispatch`].
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Adds middleware that runs for every request, matched or not.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_boxed_handler(), Arc::from(Vec::new()))
    }

    /// Registers a set of routes that share their own middleware.
    ///
    /// ```rust,no_run
    /// # use catalog::{Method, Request, Response, Router, Status};
    /// # use catalog::middleware::ApiKeyAuth;
    /// # async fn list(_: Request) -> Response { Response::status(Status::Ok) }
    /// Router::new().group(|g| {
    ///     g.layer(ApiKeyAuth::new("secret"))
    ///         .on(Method::Get, "/api/products", list)
    /// });
    /// ```
    pub fn group(self, build: impl FnOnce(Group) -> Group) -> Self {
        let group = build(Group::default());
        let chain: Chain = Arc::from(group.layers);
        group.routes.into_iter().fold(self, |router, (method, path, handler)| {
            router.add(method, &path, handler, Arc::clone(&chain))
        })
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler, middleware: Chain) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Route { handler, middleware })
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Matches non-strictly: `/items/` and `/items` reach the same route.
    fn lookup(&self, method: &str, path: &str) -> Option<(&Route, HashMap<String, String>)> {
        let method: Method = method.parse().ok()?;
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let matched = self.routes.get(&method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value, params))
    }

    /// Runs one request through the middleware chain and its handler.
    ///
    /// Never fails: unmatched requests get a generic 404, handler errors are
    /// already responses by the time they come back.
    pub async fn dispatch(&self, req: Request) -> Response {
        let span = info_span!("request", method = %req.method(), path = %req.path());
        self.run(req).instrument(span).await
    }

    async fn run(&self, req: Request) -> Response {
        let started = Instant::now();
        let mut ran: Vec<&Arc<dyn Middleware>> = Vec::new();

        let response = 'chain: {
            for mw in &self.layers {
                ran.push(mw);
                if let Some(res) = mw.before(&req) {
                    break 'chain res;
                }
            }

            let Some((route, params)) = self.lookup(req.method(), req.path()) else {
                break 'chain route_not_found(&req);
            };

            for mw in route.middleware.iter() {
                ran.push(mw);
                if let Some(res) = mw.before(&req) {
                    break 'chain res;
                }
            }

            route.handler.call(req.with_params(params)).await
        };

        let latency = started.elapsed();
        for mw in ran.iter().rev() {
            mw.after(&response, latency);
        }
        response
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn route_not_found(req: &Request) -> Response {
    let target = req.target();
    debug!(%target, "no route matched");
    let body = json!({
        "error": "NotFound",
        "message": format!("Route {target} not found"),
    });
    (Status::NotFound, Json(body)).into_response()
}

/// Routes collected under shared middleware. See [`Router::group`].
#[derive(Default)]
pub struct Group {
    layers: Vec<Arc<dyn Middleware>>,
    routes: Vec<(Method, String, BoxedHandler)>,
}

impl Group {
    /// Adds middleware that runs only for this group's routes.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes.push((method, path.to_owned(), handler.into_boxed_handler()));
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[derive(Clone)]
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        reject: bool,
    }

    impl Middleware for Recorder {
        fn before(&self, _req: &Request) -> Option<Response> {
            self.log.lock().unwrap().push(format!("before:{}", self.name));
            self.reject.then(|| Response::status(Status::Forbidden))
        }

        fn after(&self, _res: &Response, _latency: Duration) {
            self.log.lock().unwrap().push(format!("after:{}", self.name));
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>, reject: bool) -> Recorder {
        Recorder { name, log: Arc::clone(log), reject }
    }

    async fn echo_id(req: Request) -> Response {
        Response::json(req.param("id").unwrap_or("-").as_bytes().to_vec())
    }

    async fn fixed(_req: Request) -> Response {
        Response::json(b"\"search\"".to_vec())
    }

    #[tokio::test]
    async fn static_segment_beats_parameter() {
        let router = Router::new()
            .on(Method::Get, "/items/{id}", echo_id)
            .on(Method::Get, "/items/search", fixed);

        let res = router.dispatch(Request::builder(Method::Get, "/items/search").build()).await;
        assert_eq!(res.body(), b"\"search\"");
        let res = router.dispatch(Request::builder(Method::Get, "/items/42").build()).await;
        assert_eq!(res.body(), b"42");
    }

    #[tokio::test]
    async fn one_trailing_slash_is_ignored() {
        let router = Router::new()
            .on(Method::Get, "/", fixed)
            .on(Method::Get, "/items/{id}", echo_id);

        let res = router.dispatch(Request::builder(Method::Get, "/items/7/").build()).await;
        assert_eq!(res.body(), b"7");
        let res = router.dispatch(Request::builder(Method::Get, "/").build()).await;
        assert_eq!(res.code(), Status::Ok);
        let res = router.dispatch(Request::builder(Method::Get, "/items/7//").build()).await;
        assert_eq!(res.code(), Status::NotFound);
    }

    #[tokio::test]
    async fn group_middleware_wraps_only_its_routes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .layer(recorder("global", &log, false))
            .on(Method::Get, "/open", fixed)
            .group(|g| g.layer(recorder("gate", &log, false)).on(Method::Get, "/closed", fixed));

        router.dispatch(Request::builder(Method::Get, "/open").build()).await;
        assert_eq!(*log.lock().unwrap(), ["before:global", "after:global"]);

        log.lock().unwrap().clear();
        router.dispatch(Request::builder(Method::Get, "/closed").build()).await;
        assert_eq!(
            *log.lock().unwrap(),
            ["before:global", "before:gate", "after:gate", "after:global"]
        );
    }

    #[tokio::test]
    async fn short_circuit_skips_the_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .group(|g| g.layer(recorder("gate", &log, true)).on(Method::Get, "/closed", fixed));

        let res = router.dispatch(Request::builder(Method::Get, "/closed").build()).await;
        assert_eq!(res.code(), Status::Forbidden);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn unmatched_route_bypasses_group_middleware() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .layer(recorder("global", &log, false))
            .group(|g| g.layer(recorder("gate", &log, true)).on(Method::Get, "/closed", fixed));

        let res = router.dispatch(Request::builder(Method::Post, "/closed?x=1").build()).await;
        assert_eq!(res.code(), Status::NotFound);
        let v: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(v["error"], "NotFound");
        assert_eq!(v["message"], "Route /closed?x=1 not found");
        assert_eq!(*log.lock().unwrap(), ["before:global", "after:global"]);
    }
}
