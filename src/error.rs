//! Library error type

use reqwest::StatusCode;

/// Result alias used by the content and rendering layers
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the content API or rendering pages.
///
/// The command layer wraps these in `anyhow::Error`; the server maps them
/// to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content api returned {status} for {url}")]
    Api { status: StatusCode, url: String },
    #[error("content api has no master ref")]
    NoMasterRef,
    #[error("malformed document {id}: {reason}")]
    Document { id: String, reason: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("cursor does not belong to the content api: {0}")]
    ForeignCursor(String),
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors caused by the upstream content API rather than by us
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. } | Error::NoMasterRef)
    }
}
