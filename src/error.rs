use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a test case's setup or the whole run.
///
/// Per-test problems (transport errors, failed assertions) never surface here;
/// they are recorded on the test's asserter instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No asserter object has been configured")]
    MissingAsserter,

    #[error("Invalid test pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to read certificate authority {path}: {source}")]
    CertAuthority {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load test module `{file}`: {reason}")]
    Load { file: String, reason: String },

    #[error("Tests timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors produced by a [`crate::http::Transport`] while issuing a request.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid HTTP method `{0}`")]
    InvalidMethod(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Socket timed out: {0}")]
    Timeout(String),

    #[error("Failed to read response: {0}")]
    Body(String),

    #[error("Response body exceeded {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_timeout() {
            TransportError::Timeout(message)
        } else if err.is_connect() {
            TransportError::Connect(message)
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(message)
        } else if err.is_builder() {
            TransportError::InvalidUrl(message)
        } else {
            TransportError::Other(message)
        }
    }
}

/// Joins an error and every `source()` below it with `": "`, skipping
/// causes whose text the previous level already includes.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
