use std::time::Instant;

use serde_json::Value;
use tracing::info;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;

/// Per-request trace: a `started` event before the handler, a `finished`
/// event carrying the response status after it, then the elapsed time.
///
/// Optionally stamps fixed annotations into the request
/// [`Context`](crate::Context) on the way in, so handlers can read them back.
///
/// ```rust,no_run
/// use kite::Router;
/// use kite::middleware::Logger;
///
/// let app = Router::new().middleware(Logger::new().annotate("request", "中间件"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Logger {
    annotations: Vec<(String, Value)>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key = value` in every request's context before the handler runs.
    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.push((key.into(), value.into()));
        self
    }
}

impl Middleware for Logger {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture {
        let annotations = self.annotations.clone();

        Box::pin(async move {
            let start = Instant::now();
            let method = req.method().clone();
            let path = req.path().to_owned();

            info!(%method, %path, "started");
            for (key, value) in annotations {
                req.set(key, value);
            }

            let res = next.run(req).await;

            let status = res.status_code();
            info!(%method, %path, status, "finished");
            info!(%method, %path, elapsed = ?start.elapsed(), "time");
            res
        })
    }
}
