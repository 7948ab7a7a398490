//! Route tables for the runnable demo services.
//!
//! Each submodule exposes its handlers plus a `router` function wiring them
//! to the paths the demo serves. The `demos/` entry points only add logging
//! setup and a [`Server`](crate::Server); tests drive the same routers
//! in-process with [`Router::handle`](crate::Router::handle).
//!
//! | Module | Route |
//! |---|---|
//! | [`logging`] | `GET /ce` behind the [`Logger`](crate::middleware::Logger) middleware |
//! | [`redirect`] | `GET /index` → `301` |
//! | [`upload`] | `POST /upload`, single (`file`) or multiple (`files`) |

pub mod logging;
pub mod redirect;
pub mod upload;
