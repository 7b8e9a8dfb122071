//! Errors raised while fetching upstream data.
//!
//! None of these reach the signal engine: the snapshot assembler logs them
//! and records the affected indicator as missing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("No observations returned for {series}")]
    Empty { series: String },

    #[error("FRED API key is not configured")]
    MissingCredential,
}

impl DataError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Http(e) => e.is_timeout() || e.is_connect(),
            DataError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Keeps error bodies short enough for a log line.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX_BODY: usize = 200;
    match body.char_indices().nth(MAX_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
