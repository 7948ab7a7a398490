//! Single- and multi-file multipart uploads.
//!
//! Both handlers return as soon as they have written an error response; no
//! save is attempted after a failed parse.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::{IntoResponse, Request, Response, Router, Status};

/// Body of every single-upload failure.
pub const UPLOAD_FAILED: &str = "上传图片出错";

/// Where uploads land and how much of a form may stay in memory.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_memory: u64,
}

impl UploadConfig {
    /// Single-file settings: saves into `KITE_SAVE_DIR`.
    pub fn single(config: &Config) -> Self {
        Self { dir: config.save_dir.clone(), max_memory: config.max_multipart_memory }
    }

    /// Multi-file settings: saves into `KITE_UPLOAD_DIR`.
    pub fn multiple(config: &Config) -> Self {
        Self { dir: config.upload_dir.clone(), max_memory: config.max_multipart_memory }
    }
}

/// `POST /upload` accepting one file in field `file`.
pub fn single_router(config: UploadConfig) -> Router {
    let config = Arc::new(config);
    Router::new().post("/upload", move |req: Request| {
        let config = Arc::clone(&config);
        async move { upload_single(req, &config).await }
    })
}

/// `POST /upload` accepting any number of files in field `files`.
pub fn multiple_router(config: UploadConfig) -> Router {
    let config = Arc::new(config);
    Router::new().post("/upload", move |req: Request| {
        let config = Arc::clone(&config);
        async move { upload_multiple(req, &config).await }
    })
}

/// Saves the `file` part under its base name and echoes that name.
///
/// Any failure, whether reading the form or writing the file, answers
/// `500` with [`UPLOAD_FAILED`].
pub async fn upload_single(mut req: Request, config: &UploadConfig) -> Response {
    let file = match req.form_file("file", config.max_memory).await {
        Ok(file) => file,
        Err(e) => {
            warn!("reading upload failed: {e}");
            return (Status::InternalServerError, UPLOAD_FAILED).into_response();
        }
    };

    match file.save_to(&config.dir).await {
        Ok(path) => {
            info!(path = %path.display(), size = file.size(), "file uploaded");
            Response::text(file.base_name().unwrap_or_default())
        }
        Err(e) => {
            warn!("saving upload failed: {e}");
            (Status::InternalServerError, UPLOAD_FAILED).into_response()
        }
    }
}

/// Saves every `files` part in arrival order and reports how many.
///
/// The first failed save answers `400` and skips the remaining parts; files
/// already written stay on disk.
pub async fn upload_multiple(mut req: Request, config: &UploadConfig) -> Response {
    let form = match req.multipart_form(config.max_memory).await {
        Ok(form) => form,
        Err(e) => return (Status::BadRequest, format!("get form err: {e}")).into_response(),
    };

    let files = form.files("files");
    for file in files {
        if let Err(e) = file.save_to(&config.dir).await {
            warn!(file = %file.file_name(), "saving upload failed: {e}");
            return (Status::BadRequest, format!("save file err: {e}")).into_response();
        }
    }

    info!(count = files.len(), dir = %config.dir.display(), "files uploaded");
    Response::text(format!("{} files uploaded", files.len()))
}
