//! Permanent redirect.

use crate::{Request, Response, Router, Status};

pub const TARGET: &str = "http://www.5lmh.com";

pub fn router() -> Router {
    Router::new().get("/index", index)
}

/// `GET /index` → `301 Moved Permanently`, `location: http://www.5lmh.com`.
pub async fn index(_req: Request) -> Response {
    Response::redirect(Status::MovedPermanently, TARGET)
}
