//! Error types for LectureMind.

use thiserror::Error;

/// Library-level error type for LectureMind operations.
#[derive(Error, Debug)]
pub enum LectureMindError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Lecture not found: {0}")]
    LectureNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for LectureMind operations.
pub type Result<T> = std::result::Result<T, LectureMindError>;

/// Why an external collaborator did not produce a usable result.
///
/// These never reach HTTP clients; the pipeline substitutes a fallback value
/// and keeps the reason for logging and diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("upstream request failed: {0}")]
    Request(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("no data available: {0}")]
    NoData(String),
}

impl From<reqwest::Error> for UpstreamFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamFailure::Timeout
        } else if let Some(status) = e.status() {
            UpstreamFailure::Status(status.as_u16())
        } else if e.is_decode() {
            UpstreamFailure::MalformedResponse(e.to_string())
        } else {
            UpstreamFailure::Request(e.to_string())
        }
    }
}

impl From<serde_json::Error> for UpstreamFailure {
    fn from(e: serde_json::Error) -> Self {
        UpstreamFailure::MalformedResponse(e.to_string())
    }
}

/// A value that is always usable, plus the reason when it is a fallback.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub fallback: Option<UpstreamFailure>,
}

impl<T> Resolved<T> {
    /// Take the upstream value, or substitute `fallback` and log why.
    pub fn or_fallback(
        result: std::result::Result<T, UpstreamFailure>,
        what: &str,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match result {
            Ok(value) => Self {
                value,
                fallback: None,
            },
            Err(reason) => {
                tracing::warn!("{} unavailable, using fallback: {}", what, reason);
                Self {
                    value: fallback(),
                    fallback: Some(reason),
                }
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
