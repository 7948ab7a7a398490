//! # kite
//!
//! A minimal HTTP framework and the small services built on it: request
//! tracing middleware, a permanent redirect, single and multi-file multipart
//! uploads, plus a rule-expression validator for plain values.
//!
//! What kite covers:
//!
//! - Radix-tree routing — O(path-length) lookup via [`matchit`]
//! - Middleware — `Fn(Request, Next)` interceptors, outermost first
//! - Request-scoped [`Context`] — annotations written by middleware, read by handlers
//! - Multipart forms — [`multer`] parsing with a memory budget that spills to temp files
//! - Async I/O — tokio + hyper, HTTP/1.1 and HTTP/2
//! - Graceful shutdown — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kite::{Request, Response, Router, Server, Status};
//! use kite::middleware::Logger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kite::Error> {
//!     let app = Router::new()
//!         .middleware(Logger::new().annotate("request", "中间件"))
//!         .get("/ce", ce)
//!         .get("/index", index);
//!
//!     Server::bind("0.0.0.0:8003")?.serve(app).await
//! }
//!
//! async fn ce(req: Request) -> Response {
//!     let (value, _found) = req.lookup("request");
//!     Response::json(serde_json::json!({ "request": value }))
//! }
//!
//! async fn index(_req: Request) -> Response {
//!     Response::redirect(Status::MovedPermanently, "http://www.5lmh.com")
//! }
//! ```

mod context;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod apps;
pub mod config;
pub mod middleware;
pub mod multipart;
pub mod validate;

pub use config::Config;
pub use context::Context;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use multipart::{FormFile, MultipartError, MultipartForm, UploadError};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Router, DEFAULT_BODY_LIMIT};
pub use server::Server;
pub use status::Status;
