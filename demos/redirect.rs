//! `GET /index` answers with a permanent redirect.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example redirect
//!
//! Try:
//!   curl -i http://localhost:8003/index

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
        .serve(apps::redirect::router())
        .await
}
