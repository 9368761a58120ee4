//! Ordered fallback retrieval over a list of [`UriCandidate`]s.
//!
//! Candidates are tried strictly one after another. The first success wins and
//! later candidates are never requested. Each failure is recorded as a
//! [`NetworkError`], in attempt order. One deadline and one cancellation token
//! govern the whole operation: once either fires, the interrupted attempt is
//! recorded and no further candidate is tried.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    errors::{ErrorCollection, NetworkError, WkdError},
    transport::{TransportError, WkdTransport},
    uri::{Method, UriCandidate},
    wkd_log,
};

/// A value together with the method whose candidate produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved<T> {
    /// Method of the successful candidate.
    pub method: Method,
    /// The retrieved value.
    pub value: T,
}

impl<T> Retrieved<T> {
    /// Transform the value, keeping the method.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Retrieved<U> {
        Retrieved {
            method: self.method,
            value: f(self.value),
        }
    }
}

/// Per-call knobs for a lookup.
///
/// ```
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use wkd::RequestOptions;
///
/// let token = CancellationToken::new();
/// let options = RequestOptions::new()
///     .timeout(Duration::from_secs(5))
///     .cancellation(token.clone());
/// assert_eq!(options.effective_timeout(Duration::from_secs(100)), Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RequestOptions {
    /// Upper bound for the whole lookup. Only shortens the client default.
    pub timeout: Option<Duration>,
    /// Aborts the in-flight attempt when cancelled.
    pub cancellation: Option<CancellationToken>,
}

impl RequestOptions {
    /// No extra timeout, no cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the cancellation token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The smaller of `default` and the per-call timeout.
    ///
    /// A zero `default` means the client has no timeout of its own.
    pub fn effective_timeout(&self, default: Duration) -> Option<Duration> {
        let default = (!default.is_zero()).then_some(default);
        match (default, self.timeout) {
            (Some(default), Some(timeout)) => Some(default.min(timeout)),
            (default, timeout) => default.or(timeout),
        }
    }
}

/// Try each candidate in order and return the first body retrieved.
///
/// On failure the collection holds one [`WkdError::Network`] per attempted
/// candidate. An empty candidate list fails with an empty collection.
pub async fn fetch(
    transport: &dyn WkdTransport,
    candidates: &[UriCandidate],
    options: &RequestOptions,
    default_timeout: Duration,
) -> Result<Retrieved<Bytes>, ErrorCollection> {
    let deadline = options
        .effective_timeout(default_timeout)
        .and_then(|timeout| Instant::now().checked_add(timeout));
    let cancellation = options.cancellation.clone().unwrap_or_default();

    let mut errors = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        wkd_log!(debug, "{} method: requesting {}", candidate.method, candidate.uri);

        match attempt(transport, candidate, deadline, &cancellation).await {
            Ok(body) => {
                wkd_log!(
                    debug,
                    "{} method: retrieved {} bytes from {}",
                    candidate.method,
                    body.len(),
                    candidate.uri
                );
                return Ok(Retrieved {
                    method: candidate.method,
                    value: body,
                });
            }
            Err(source) => {
                let interrupted = matches!(
                    source,
                    TransportError::Timeout | TransportError::Cancelled
                ) && (cancellation.is_cancelled() || deadline_passed(deadline));

                let error = NetworkError::new(candidate, source);
                wkd_log!(warn, "{} {}: {}", error.fallback_message, candidate.uri, error.source);
                errors.push(WkdError::Network(error));

                if interrupted {
                    break;
                }
            }
        }
    }

    Err(ErrorCollection::new(errors))
}

async fn attempt(
    transport: &dyn WkdTransport,
    candidate: &UriCandidate,
    deadline: Option<Instant>,
    cancellation: &CancellationToken,
) -> Result<Bytes, TransportError> {
    if cancellation.is_cancelled() {
        return Err(TransportError::Cancelled);
    }

    let request = transport.get(&candidate.uri);

    tokio::select! {
        biased;
        _ = cancellation.cancelled() => Err(TransportError::Cancelled),
        result = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, request)
                    .await
                    .unwrap_or(Err(TransportError::Timeout)),
                None => request.await,
            }
        } => result,
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}
