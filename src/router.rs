//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware registered on
//! the router wraps every dispatch, matched or not.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Chain, Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Default cap on request body size: 32 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 32 << 20;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or drive it in-process with [`Router::handle`]. Every registration returns
/// `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    chain: Chain,
    not_found: BoxedHandler,
    body_limit: usize,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            chain: Arc::from(Vec::<Arc<dyn Middleware>>::new()),
            not_found: not_found.into_boxed_handler(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use kite::{Method, Request, Response, Router};
    /// # async fn download(_: Request) -> Response { Response::text("") }
    /// # async fn upload(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/files/{name}", download)
    ///     .on(Method::Post, "/upload",       upload);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error rather than a runtime condition.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    /// Appends `mw` to the middleware chain. The first middleware added is
    /// the outermost.
    pub fn middleware(mut self, mw: impl Middleware) -> Self {
        let mut chain: Vec<Arc<dyn Middleware>> = self.chain.iter().cloned().collect();
        chain.push(Arc::new(mw));
        self.chain = chain.into();
        self
    }

    /// Replaces the handler used when no route matches (default: bare 404).
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.not_found = handler.into_boxed_handler();
        self
    }

    /// Caps request bodies at `bytes` (default [`DEFAULT_BODY_LIMIT`]).
    ///
    /// Larger bodies answer `413` before any middleware runs. Multipart
    /// bodies are streamed, so the server only notices the overflow while the
    /// form is being read; the handler sees it as a parse error.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub(crate) fn max_body_size(&self) -> usize {
        self.body_limit
    }

    /// Dispatches one request through the middleware chain and the matching
    /// handler, returning the response the server would send.
    pub async fn handle(&self, req: http::Request<Bytes>) -> Response {
        if req.body().len() > self.body_limit {
            return Response::status(Status::ContentTooLarge);
        }
        self.dispatch(Request::from(req)).await
    }

    pub(crate) async fn dispatch(&self, req: Request) -> Response {
        let Ok(method) = Method::try_from(req.method()) else {
            return Response::status(Status::MethodNotAllowed);
        };

        let (endpoint, req) = match self.lookup(method, req.path()) {
            Some((handler, params)) => (handler, req.with_params(params)),
            None => (Arc::clone(&self.not_found), req),
        };

        Next::new(Arc::clone(&self.chain), endpoint).run(req).await
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

async fn not_found(_req: Request) -> Status {
    Status::NotFound
}
