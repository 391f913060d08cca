use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Truncates a response body so an error page does not flood the status line.
    pub(crate) fn status(status: reqwest::StatusCode, body: &str) -> Self {
        const MAX_BODY: usize = 200;
        let body = body.trim();
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((cut, _)) => format!("{}…", &body[..cut]),
            None => body.to_string(),
        };
        Self::Status { status, body }
    }
}
