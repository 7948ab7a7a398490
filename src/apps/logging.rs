//! Request tracing with a request-scoped annotation.

use serde_json::json;
use tracing::info;

use crate::middleware::Logger;
use crate::{Request, Response, Router};

/// Context key the middleware writes and `/ce` reads.
pub const ANNOTATION_KEY: &str = "request";
pub const ANNOTATION_VALUE: &str = "中间件";

pub fn router() -> Router {
    Router::new()
        .middleware(Logger::new().annotate(ANNOTATION_KEY, ANNOTATION_VALUE))
        .get("/ce", ce)
}

/// `GET /ce` — echoes the annotation as `{"request": <value or null>}`.
pub async fn ce(req: Request) -> Response {
    let (value, exists) = req.lookup(ANNOTATION_KEY);
    if exists {
        info!(%value, "annotation found");
    }
    Response::json(json!({ ANNOTATION_KEY: value }))
}
