//! Error types for the headline reader.
//!
//! Each external collaborator gets its own error enum so callers can decide
//! how far a failure should travel. None of these are fatal to the process:
//! article-level failures degrade to snippet text or a retry affordance.
//!
//! Content extraction has no error type. It always returns a (possibly
//! empty) string.

use thiserror::Error;

/// Failures talking to the headline API.
#[derive(Debug, Error)]
pub enum NewsError {
    /// The request URL could not be built from the configured base URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (DNS, connect, TLS, body read).
    #[error("network error: {0}")]
    NetworkError(String),

    /// The body was not the expected JSON shape.
    #[error("decoding error: {0}")]
    DecodingError(String),

    /// The API answered but reported a failure.
    #[error("API error: {0}")]
    ApiError(String),
}

/// Failures fetching raw article HTML.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("body could not be decoded as text: {0}")]
    Decoding(String),
}

/// Failures producing an AI summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Neither a body nor a snippet/description is available.
    #[error("no article text available to summarize")]
    InsufficientContent,

    /// Another summary request for the same article is still running.
    #[error("a summary request for this article is already in progress")]
    InProgress,

    /// The summarizer answered with an empty summary.
    #[error("summarizer returned an empty response")]
    InvalidResponse,

    /// The body was not JSON or lacked the `response` field.
    #[error("summarizer response had an unexpected format: {0}")]
    InvalidResponseFormat(String),

    /// Non-200 HTTP status from the summarizer.
    #[error("summarizer API error (status {0})")]
    ApiError(u16),

    #[error("network error: {0}")]
    NetworkError(String),
}

impl SummaryError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::ApiError(code) => *code >= 500,
            Self::InsufficientContent
            | Self::InProgress
            | Self::InvalidResponse
            | Self::InvalidResponseFormat(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no news API key configured (use --api-key, NEWS_API_KEY or the config file)")]
    MissingApiKey,
}
