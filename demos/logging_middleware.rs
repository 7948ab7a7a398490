//! Every request is traced before and after its handler; `/ce` echoes the
//! annotation the middleware stores in the request context.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example logging_middleware
//!
//! Try:
//!   curl http://localhost:8003/ce

use kite::{Config, Server, apps};

#[tokio::main]
async fn main() -> Result<(), kite::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    Server::bind(&config.addr)?
        .serve(apps::logging::router())
        .await
}
