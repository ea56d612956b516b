pub mod fixture;
pub mod http;
pub mod retry;

pub use fixture::FixtureFetcher;
pub use http::{HttpFetcher, HttpSource};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use extract::RawDocument;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no saved result for {hall_ticket} in {dir}")]
    NotFound { hall_ticket: String, dir: PathBuf },

    #[error("hall ticket {0:?} cannot be used as a file name")]
    UnsafeIdentifier(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Worth another attempt: network trouble or a server-side error.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Turns a hall ticket number into the document the results site returns
/// for it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, hall_ticket: &str) -> Result<RawDocument, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        let server = FetchError::Status {
            url: "http://x".to_string(),
            status: 503,
        };
        let client = FetchError::Status {
            url: "http://x".to_string(),
            status: 404,
        };

        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!FetchError::UnsafeIdentifier("../x".to_string()).is_retryable());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = FetchError::Status {
            url: "http://results.example/res.jsp".to_string(),
            status: 502,
        };
        assert_eq!(err.to_string(), "http://results.example/res.jsp answered with HTTP 502");
    }
}
