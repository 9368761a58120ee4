//! The GET-capable transport the retrieval protocol runs on.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Why a single GET did not produce a body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("Server responded with {status}: {message}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Response body text, or the canonical reason when unreadable.
        message: String,
    },

    /// The server could not be reached or the exchange broke off.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request did not complete in time.
    #[error("The request timed out")]
    Timeout,

    /// The caller cancelled the request.
    #[error("The request was cancelled")]
    Cancelled,
}

impl TransportError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outbound HTTP used by [`crate::WkdClient`].
///
/// Implementations are shared across calls and must be safe to use
/// concurrently. Timeouts and cancellation are applied by the caller around
/// each `get`, so implementations may simply await the response.
#[async_trait]
pub trait WkdTransport: Send + Sync + Debug {
    /// Fetch the body of `url`, failing on anything but a 2xx response.
    async fn get(&self, url: &Url) -> Result<Bytes, TransportError>;
}
