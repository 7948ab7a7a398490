//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted — `Response::status()`,
//! `Response::builder().status()`, `Response::redirect()`, or as a bare
//! handler return value.
//!
//! ```rust
//! use kite::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! Response::builder()
//!     .status(Status::BadRequest)
//!     .text("save file err: disk full");
//!
//! Response::redirect(Status::MovedPermanently, "http://www.5lmh.com");
//! ```

/// The status codes kite's handlers and server produce.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    NoContent,            // 204

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    MovedPermanently,     // 301
    Found,                // 302
    SeeOther,             // 303
    TemporaryRedirect,    // 307
    PermanentRedirect,    // 308

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    ContentTooLarge,      // 413

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
}

impl Status {
    /// `true` for the 3xx codes that carry a `location` header.
    pub fn is_redirect(self) -> bool {
        matches!(
            self,
            Self::MovedPermanently
                | Self::Found
                | Self::SeeOther
                | Self::TemporaryRedirect
                | Self::PermanentRedirect
        )
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::NoContent            => 204,
            Status::MovedPermanently     => 301,
            Status::Found                => 302,
            Status::SeeOther             => 303,
            Status::TemporaryRedirect    => 307,
            Status::PermanentRedirect    => 308,
            Status::BadRequest           => 400,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::ContentTooLarge      => 413,
            Status::InternalServerError  => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        // Every variant maps to a registered code, so this never falls back.
        http::StatusCode::from_u16(s.into()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_http_status_code() {
        assert_eq!(http::StatusCode::from(Status::MovedPermanently), http::StatusCode::MOVED_PERMANENTLY);
        assert_eq!(u16::from(Status::BadRequest), 400);
        assert_eq!(http::StatusCode::from(Status::ContentTooLarge), http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn only_3xx_are_redirects() {
        assert!(Status::MovedPermanently.is_redirect());
        assert!(Status::PermanentRedirect.is_redirect());
        assert!(!Status::Ok.is_redirect());
        assert!(!Status::NotFound.is_redirect());
    }
}
