//! Error types for the Banner scraping session.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the registration portal.
///
/// Every variant means the session or the portal contract is broken, so
/// none of them are retried and all of them abort the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Portal answered with something other than 200 OK
    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The landing page no longer carries the synchronizer token
    #[error("Could not find synchronizer token in search page ({body_len} bytes)")]
    TokenNotFound { body_len: usize },

    /// The portal refused to set the term on the session
    #[error("Failed to select term {term}: {message}")]
    TermSelection { term: String, message: String },

    /// Response body did not match the expected JSON envelope
    #[error("Failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    Url { message: String },
}

impl ScrapeError {
    /// Builds an `UnexpectedStatus` error, keeping only the head of the body.
    pub fn unexpected_status(url: impl Into<String>, status: StatusCode, body: &str) -> Self {
        ScrapeError::UnexpectedStatus {
            url: url.into(),
            status,
            body: body.chars().take(200).collect(),
        }
    }

    /// Builds a `Decode` error for the named response.
    pub fn decode(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ScrapeError::Decode {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ScrapeError {
    fn from(err: url::ParseError) -> Self {
        ScrapeError::Url {
            message: err.to_string(),
        }
    }
}
