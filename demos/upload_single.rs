//! Saves one uploaded file into the working directory (or `KITE_SAVE_DIR`).
//!
//! Run with:
//!   RUST_LOG=info cargo run --example upload_single
//!
//! Try:
//!   curl -F 'file=@a.txt' http://localhost:8003/upload

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
    tracing::info!(dir = %config.save_dir.display(), max_memory = config.max_multipart_memory, max_body = config.max_body_size, "single upload");

    Server::bind(&config.addr)?
        .serve(upload::single_router(UploadConfig::single(&config)).body_limit(config.max_body_size))
        .await
}
