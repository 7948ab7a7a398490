//! `multipart/form-data` reader.
//!
//! [`MultipartForm::parse`] walks the request body field by field with
//! [`multer`], pulling it off the connection as it goes; the server leaves
//! multipart bodies uncollected so an upload never sits in memory whole. Text
//! fields, and parts sent with an empty filename, are kept as strings. File
//! fields are buffered in memory until the form's memory budget runs out; from
//! then on each file part is written to a [`tempfile::NamedTempFile`] instead.
//! Temp files are removed when the form (or the [`FormFile`] taken out of it)
//! is dropped. The total body size is capped by [`Router::body_limit`].
//!
//! [`Router::body_limit`]: crate::Router::body_limit
//!
//! ```rust,no_run
//! use kite::{Request, Response, Status};
//!
//! async fn upload(mut req: Request) -> Response {
//!     let file = match req.form_file("file", 8 << 20).await {
//!         Ok(file) => file,
//!         Err(e) => return Response::builder().status(Status::BadRequest).text(e.to_string()),
//!     };
//!     match file.save_to(".").await {
//!         Ok(_) => Response::text(file.file_name()),
//!         Err(e) => Response::builder().status(Status::InternalServerError).text(e.to_string()),
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream, StreamExt};
use http_body_util::{BodyExt, LengthLimitError};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::request::{Body, BoxError, Request};

/// Default in-memory budget for file parts: 8 MiB.
pub const DEFAULT_MAX_MEMORY: u64 = 8 << 20;

/// Why a multipart body could not be read.
#[derive(Debug, Error)]
pub enum MultipartError {
    #[error("request Content-Type isn't multipart/form-data")]
    NotMultipart,

    #[error("no such file in field `{0}`")]
    MissingFile(String),

    #[error("request body is too large")]
    TooLarge,

    #[error(transparent)]
    Parse(#[from] multer::Error),

    #[error("spilling file part to disk: {0}")]
    Spill(#[from] std::io::Error),
}

/// Why an uploaded file could not be saved.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid file name `{0}`")]
    InvalidFileName(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── FormFile ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum FileData {
    Memory(Bytes),
    Disk(NamedTempFile),
}

/// One uploaded file: its client-supplied name plus the content, held either
/// in memory or in a temp file.
#[derive(Debug)]
pub struct FormFile {
    field: String,
    file_name: String,
    content_type: Option<String>,
    size: u64,
    data: FileData,
}

impl FormFile {
    pub fn field(&self) -> &str { &self.field }

    /// The filename exactly as the client sent it.
    pub fn file_name(&self) -> &str { &self.file_name }

    /// The last component of the client filename, the name the file is
    /// saved under. `None` when there is no usable component.
    pub fn base_name(&self) -> Option<&str> { base_name(&self.file_name) }

    pub fn content_type(&self) -> Option<&str> { self.content_type.as_deref() }
    pub fn size(&self) -> u64 { self.size }

    /// `false` once the part has been spilled to temporary storage.
    pub fn is_in_memory(&self) -> bool {
        matches!(self.data, FileData::Memory(_))
    }

    /// Reads the whole file content.
    pub async fn bytes(&self) -> std::io::Result<Bytes> {
        match &self.data {
            FileData::Memory(b) => Ok(b.clone()),
            FileData::Disk(tmp) => tokio::fs::read(tmp.path()).await.map(Bytes::from),
        }
    }

    /// Saves the file as `dir/<base name>`, creating `dir` if needed, and
    /// returns the written path.
    ///
    /// Only the last component of the client filename is used, so
    /// `../../etc/passwd` lands as `dir/passwd`. A name with no usable last
    /// component (`""`, `.`, `..`) is rejected.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, UploadError> {
        let dir = dir.as_ref();
        let name = self.base_name()
            .ok_or_else(|| UploadError::InvalidFileName(self.file_name.clone()))?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| UploadError::Io { path: dir.to_owned(), source })?;

        let dest = dir.join(name);
        self.save_as(&dest).await?;
        Ok(dest)
    }

    /// Saves the file at exactly `dest`.
    pub async fn save_as(&self, dest: impl AsRef<Path>) -> Result<(), UploadError> {
        let dest = dest.as_ref();
        let res = match &self.data {
            FileData::Memory(b) => tokio::fs::write(dest, b).await,
            FileData::Disk(tmp) => tokio::fs::copy(tmp.path(), dest).await.map(drop),
        };
        res.map_err(|source| UploadError::Io { path: dest.to_owned(), source })?;
        debug!(path = %dest.display(), size = self.size, "saved uploaded file");
        Ok(())
    }
}

/// Last path component of a client filename, accepting both `/` and `\`
/// separators.
fn base_name(file_name: &str) -> Option<&str> {
    let base = file_name.rsplit(['/', '\\']).next()?;
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}

/// Whether a `Content-Type` value announces a `multipart/form-data` body.
pub(crate) fn is_multipart(content_type: &str) -> bool {
    content_type
        .get(..19)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("multipart/form-data"))
}

// ── MultipartForm ─────────────────────────────────────────────────────────────

/// A fully read `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<FormFile>>,
}

impl MultipartForm {
    /// Reads every field of `req`'s body, consuming it.
    ///
    /// `max_memory` bounds the file bytes kept in memory across the whole
    /// form. A file part that does not fit in what is left is streamed to a
    /// temp file.
    pub async fn parse(req: &mut Request, max_memory: u64) -> Result<Self, MultipartError> {
        let content_type = req.header("content-type").ok_or(MultipartError::NotMultipart)?;
        if !is_multipart(content_type) {
            return Err(MultipartError::NotMultipart);
        }
        let boundary = multer::parse_boundary(content_type)?;

        let chunks: BoxStream<'static, Result<Bytes, BoxError>> = match req.take_body() {
            Body::Buffered(bytes) => stream::iter([Ok(bytes)]).boxed(),
            Body::Streaming(body) => body.into_data_stream().boxed(),
        };
        let multipart = multer::Multipart::new(chunks, boundary);

        Self::read_fields(multipart, max_memory).await.map_err(|e| match e {
            MultipartError::Parse(multer::Error::StreamReadFailed(source))
                if source.is::<LengthLimitError>() =>
            {
                MultipartError::TooLarge
            }
            e => e,
        })
    }

    async fn read_fields(
        mut multipart: multer::Multipart<'static>,
        max_memory: u64,
    ) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        let mut remaining = max_memory;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();

            // A file input left empty arrives with `filename=""`; that is a value.
            let file_name = match field.file_name() {
                Some(f) if !f.is_empty() => f.to_owned(),
                _ => {
                    let text = field.text().await?;
                    form.values.entry(name).or_default().push(text);
                    continue;
                }
            };

            let content_type = field.content_type().map(ToString::to_string);
            let (data, size) = read_file_part(field, &mut remaining).await?;
            debug!(field = %name, file = %file_name, size, in_memory = matches!(data, FileData::Memory(_)), "read file part");

            form.files.entry(name.clone()).or_default().push(FormFile {
                field: name,
                file_name,
                content_type,
                size,
                data,
            });
        }

        Ok(form)
    }

    /// First text value sent under `field`.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field)?.first().map(String::as_str)
    }

    /// All files sent under `field`, in arrival order.
    pub fn files(&self, field: &str) -> &[FormFile] {
        self.files.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// First file sent under `field`.
    pub fn file(&self, field: &str) -> Option<&FormFile> {
        self.files(field).first()
    }

    /// Removes and returns the first file sent under `field`.
    pub fn take_file(&mut self, field: &str) -> Option<FormFile> {
        let files = self.files.get_mut(field)?;
        if files.is_empty() { None } else { Some(files.remove(0)) }
    }

    /// Total number of file parts in the form.
    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

/// Buffers one file part in memory while it fits in `remaining`, switching to
/// a temp file at the first chunk that would overflow it.
async fn read_file_part(
    mut field: multer::Field<'static>,
    remaining: &mut u64,
) -> Result<(FileData, u64), MultipartError> {
    let mut buf = BytesMut::new();
    let mut spill: Option<(NamedTempFile, tokio::fs::File)> = None;
    let mut size = 0u64;

    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;

        if let Some((_, file)) = spill.as_mut() {
            file.write_all(&chunk).await?;
            continue;
        }

        if size > *remaining {
            let tmp = NamedTempFile::new()?;
            let mut file = tokio::fs::File::from_std(tmp.reopen()?);
            file.write_all(&buf).await?;
            file.write_all(&chunk).await?;
            buf.clear();
            spill = Some((tmp, file));
        } else {
            buf.extend_from_slice(&chunk);
        }
    }

    match spill {
        Some((tmp, mut file)) => {
            file.flush().await?;
            Ok((FileData::Disk(tmp), size))
        }
        None => {
            *remaining -= size;
            Ok((FileData::Memory(buf.freeze()), size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-KITE-BOUNDARY";

    fn body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut out = String::new();
        for (name, file_name, content) in parts {
            out.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(f) => out.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: text/plain\r\n\r\n"
                )),
                None => out.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")),
            }
            out.push_str(content);
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{BOUNDARY}--\r\n"));
        out
    }

    fn raw(content_type: &str, body: String) -> http::Request<Bytes> {
        http::Request::builder()
            .method("POST")
            .uri("/upload")
            .header("content-type", content_type)
            .body(Bytes::from(body))
            .unwrap()
    }

    fn request(content_type: &str, body: String) -> Request {
        raw(content_type, body).into()
    }

    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Request {
        request(&format!("multipart/form-data; boundary={BOUNDARY}"), body(parts))
    }

    /// Like [`multipart`], but the body reaches the parser as a stream.
    fn streamed(parts: &[(&str, Option<&str>, &str)], wrap: impl FnOnce(Bytes) -> BoxBody) -> Request {
        let (head, payload) =
            raw(&format!("multipart/form-data; boundary={BOUNDARY}"), body(parts)).into_parts();
        Request::from_parts(head, Body::Streaming(wrap(payload)))
    }

    type BoxBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name("a.txt"), Some("a.txt"));
        assert_eq!(base_name("../../etc/passwd"), Some("passwd"));
        assert_eq!(base_name(r"C:\Users\me\a.txt"), Some("a.txt"));
        assert_eq!(base_name(".."), None);
        assert_eq!(base_name("dir/"), None);
        assert_eq!(base_name(""), None);
    }

    #[tokio::test]
    async fn separates_values_and_files() {
        let mut req = multipart(&[
            ("title", None, "report"),
            ("files", Some("a.txt"), "one"),
            ("files", Some("b.txt"), "two"),
        ]);
        let form = MultipartForm::parse(&mut req, DEFAULT_MAX_MEMORY).await.unwrap();

        assert_eq!(form.value("title"), Some("report"));
        let names: Vec<_> = form.files("files").iter().map(FormFile::file_name).collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
        assert_eq!(form.file_count(), 2);
        assert_eq!(form.file("files").unwrap().content_type(), Some("text/plain"));
        assert!(form.files("other").is_empty());
    }

    #[test]
    fn content_type_check_ignores_case_and_parameters() {
        assert!(is_multipart("multipart/form-data; boundary=x"));
        assert!(is_multipart("Multipart/Form-Data"));
        assert!(!is_multipart("multipart/mixed; boundary=x"));
        assert!(!is_multipart("text/plain"));
    }

    #[tokio::test]
    async fn empty_file_name_is_a_value() {
        let mut req = multipart(&[
            ("files", Some("a.txt"), "one"),
            ("files", Some(""), ""),
        ]);
        let form = MultipartForm::parse(&mut req, DEFAULT_MAX_MEMORY).await.unwrap();

        assert_eq!(form.file_count(), 1);
        assert_eq!(form.files("files")[0].file_name(), "a.txt");
        assert_eq!(form.value("files"), Some(""));
    }

    #[tokio::test]
    async fn reads_a_streamed_body() {
        let mut req = streamed(&[("files", Some("a.txt"), "streamed")], |payload| {
            let (head, tail) = payload.split_at(payload.len() / 2);
            let frames = stream::iter([
                Ok::<_, BoxError>(hyper::body::Frame::data(Bytes::copy_from_slice(head))),
                Ok(hyper::body::Frame::data(Bytes::copy_from_slice(tail))),
            ]);
            BodyExt::boxed(http_body_util::StreamBody::new(frames))
        });

        let form = MultipartForm::parse(&mut req, DEFAULT_MAX_MEMORY).await.unwrap();

        assert_eq!(form.files("files")[0].bytes().await.unwrap().as_ref(), b"streamed");
    }

    #[tokio::test]
    async fn body_past_limit_is_too_large() {
        let mut req = streamed(&[("files", Some("a.txt"), "0123456789abcdef")], |payload| {
            http_body_util::Limited::new(http_body_util::Full::new(payload), 32).boxed()
        });

        let err = MultipartForm::parse(&mut req, DEFAULT_MAX_MEMORY).await.unwrap_err();
        assert!(matches!(err, MultipartError::TooLarge));
    }

    #[tokio::test]
    async fn spills_once_budget_is_spent() {
        let mut req = multipart(&[
            ("files", Some("small.txt"), "1234"),
            ("files", Some("big.txt"), "0123456789"),
        ]);
        let form = MultipartForm::parse(&mut req, 8).await.unwrap();
        let files = form.files("files");

        assert!(files[0].is_in_memory());
        assert!(!files[1].is_in_memory());
        assert_eq!(files[1].size(), 10);
        assert_eq!(files[1].bytes().await.unwrap().as_ref(), b"0123456789");
    }

    #[tokio::test]
    async fn rejects_non_multipart_bodies() {
        let mut req = request("application/json", "{}".to_owned());
        let err = MultipartForm::parse(&mut req, DEFAULT_MAX_MEMORY).await.unwrap_err();
        assert!(matches!(err, MultipartError::NotMultipart));
    }

    #[tokio::test]
    async fn rejects_missing_boundary() {
        let mut req = request("multipart/form-data", String::new());
        let err = MultipartForm::parse(&mut req, DEFAULT_MAX_MEMORY).await.unwrap_err();
        assert!(matches!(err, MultipartError::Parse(_)));
    }

    #[tokio::test]
    async fn form_file_reports_missing_field() {
        let mut req = multipart(&[("other", Some("a.txt"), "x")]);
        let err = req.form_file("file", DEFAULT_MAX_MEMORY).await.unwrap_err();
        assert!(matches!(err, MultipartError::MissingFile(f) if f == "file"));
    }

    #[tokio::test]
    async fn save_to_creates_dir_and_uses_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("uploads");
        let mut req = multipart(&[("file", Some("../a.txt"), "hello")]);
        let file = req.form_file("file", DEFAULT_MAX_MEMORY).await.unwrap();

        let saved = file.save_to(&target).await.unwrap();

        assert_eq!(saved, target.join("a.txt"));
        assert_eq!(std::fs::read_to_string(saved).unwrap(), "hello");
    }

    #[tokio::test]
    async fn save_to_rejects_unusable_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = multipart(&[("file", Some(".."), "x")]);
        let file = req.form_file("file", DEFAULT_MAX_MEMORY).await.unwrap();

        let err = file.save_to(dir.path()).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidFileName(n) if n == ".."));
    }
}
