//! Saves every file sent under `files` into `./uploads` (or `KITE_UPLOAD_DIR`).
//!
//! Run with:
//!   RUST_LOG=info cargo run --example upload_multiple
//!
//! Try:
//!   curl -F 'files=@a.txt' -F 'files=@b.txt' http://localhost:8003/upload

use kite::apps::upload::{self, UploadConfig};
use kite::{Config, Server};

#[tokio::main]
async fn main() -> Result<(), kite::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(dir = %config.upload_dir.display(), max_memory = config.max_multipart_memory, max_body = config.max_body_size, "multi upload");

    Server::bind(&config.addr)?
        .serve(upload::multiple_router(UploadConfig::multiple(&config)).body_limit(config.max_body_size))
        .await
}
