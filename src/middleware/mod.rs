//! Middleware layer.
//!
//! Middleware wraps every request the router dispatches, including the ones
//! that end in a 404. Each middleware receives the [`Request`] and a [`Next`]
//! continuation; whatever it does before `next.run(req).await` happens before
//! the handler, whatever it does after happens once the handler has produced
//! its [`Response`].
//!
//! ```rust,no_run
//! use kite::{Request, Response, Router};
//! use kite::middleware::{Logger, Next};
//!
//! async fn stamp(mut req: Request, next: Next) -> Response {
//!     req.set("stamped", true);
//!     next.run(req).await
//! }
//!
//! let app = Router::new()
//!     .middleware(Logger::new())
//!     .middleware(stamp);
//! ```
//!
//! Middleware registered first is outermost: it sees the request first and
//! the response last.

mod logger;

pub use logger::Logger;

use std::future::Future;
use std::sync::Arc;

pub use crate::handler::BoxFuture;

use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;

/// A request interceptor.
///
/// Implemented for every `Fn(Request, Next) -> impl Future<Output = Response>`,
/// so a plain `async fn` works. Implement it by hand when the middleware
/// carries configuration (see [`Logger`]).
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self)(req, next))
    }
}

/// The shared, frozen middleware chain of a router.
pub(crate) type Chain = Arc<[Arc<dyn Middleware>]>;

/// The remainder of the chain: the middleware not yet run, then the handler.
pub struct Next {
    chain: Chain,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(chain: Chain, endpoint: BoxedHandler) -> Self {
        Self { chain, index: 0, endpoint }
    }

    /// Passes `req` to the next middleware, or to the handler once the chain
    /// is exhausted.
    pub fn run(mut self, req: Request) -> BoxFuture {
        match self.chain.get(self.index).cloned() {
            Some(mw) => {
                self.index += 1;
                mw.handle(req, self)
            }
            None => self.endpoint.call(req),
        }
    }
}
