//! Unified error types for the `wkd` crate.
//!
//! Lookups fail with an ordered [`ErrorCollection`]: one entry per failed
//! candidate URI, or a single entry describing why a successful response body
//! could not be interpreted. The top-level [`Error`] separates those runtime
//! failures from calls made with unusable arguments, which never reach the
//! network.
//!
//! Expected domain outcomes (rejected keys, malformed policy lines) are not
//! errors; they are reported inside the successful responses.

use std::{fmt, ops::Deref};

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;
pub use wkd_common::PolicyParsingError;

use crate::{
    transport::TransportError,
    uri::{Method, UriCandidate},
};

// --- Build-Time Error ---

/// Errors that can occur while building a [`crate::WkdClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to build the HTTP client (reqwest configuration).
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

// --- Per-attempt and per-body errors ---

/// A failed attempt against one candidate URI.
#[derive(Debug, Clone, Error)]
#[error("{fallback_message} [{source}]")]
pub struct NetworkError {
    /// Method of the candidate that failed.
    pub method: Method,
    /// The URI that was requested.
    pub uri: Url,
    /// Human-readable fallback message of the candidate.
    pub fallback_message: &'static str,
    /// What the transport reported.
    pub source: TransportError,
}

impl NetworkError {
    pub(crate) fn new(candidate: &UriCandidate, source: TransportError) -> Self {
        Self {
            method: candidate.method,
            uri: candidate.uri.clone(),
            fallback_message: candidate.fallback_message,
            source,
        }
    }

    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        self.source.status()
    }
}

/// A successful response whose content is not what the protocol expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataValidationError {
    /// The content is not a mail address.
    #[error("Invalid e-mail address: {input}")]
    InvalidMailAddress {
        /// The offending input, as received.
        input: String,
        /// Why parsing failed.
        source: wkd_common::mail::Error,
    },

    /// The content could not be read as text.
    #[error("Unreadable response content: {message}")]
    UnreadableContent {
        /// Reader or decoder message.
        message: String,
    },
}

impl DataValidationError {
    pub(crate) fn invalid_mail_address(input: &str, source: wkd_common::mail::Error) -> Self {
        Self::InvalidMailAddress {
            input: input.to_string(),
            source,
        }
    }
}

/// Certificate bytes that the key parser could not decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct KeyParsingError {
    /// Message of the parsing backend.
    pub message: String,
}

impl KeyParsingError {
    /// Wrap a parser message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Any error a lookup can report.
#[derive(Debug, Clone, Error)]
pub enum WkdError {
    /// A candidate URI could not be retrieved.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// A response body could not be interpreted.
    #[error(transparent)]
    DataValidation(#[from] DataValidationError),

    /// The key parser rejected the certificate bytes.
    #[error(transparent)]
    KeyParsing(#[from] KeyParsingError),

    /// A policy file line could not be applied.
    #[error(transparent)]
    PolicyParsing(#[from] PolicyParsingError),
}

impl WkdError {
    /// The network error, if this is one.
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self {
            WkdError::Network(err) => Some(err),
            _ => None,
        }
    }
}

/// Ordered errors of one lookup, in the order they were encountered.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollection(Vec<WkdError>);

impl ErrorCollection {
    /// Wrap `errors`, keeping their order.
    pub fn new(errors: Vec<WkdError>) -> Self {
        Self(errors)
    }

    /// Consume into the underlying list.
    pub fn into_vec(self) -> Vec<WkdError> {
        self.0
    }
}

impl Deref for ErrorCollection {
    type Target = [WkdError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for ErrorCollection {
    type Item = WkdError;
    type IntoIter = std::vec::IntoIter<WkdError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a WkdError;
    type IntoIter = std::slice::Iter<'a, WkdError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<WkdError>> for ErrorCollection {
    fn from(errors: Vec<WkdError>) -> Self {
        Self(errors)
    }
}

impl From<WkdError> for ErrorCollection {
    fn from(error: WkdError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ErrorCollection {}

// --- The Main Operational Error Enum ---

/// The crate’s top-level error type.
///
/// - [`Error::InvalidInput`]: the call itself was unusable; nothing was sent.
/// - [`Error::Lookup`]: the lookup ran and failed; see the collected errors.
/// - [`Error::Build`]: construction of the client failed.
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was missing or unusable.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the argument.
        message: String,
    },

    /// The lookup failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] ErrorCollection),

    /// Building the client failed.
    #[error("Client build failed: {0}")]
    Build(#[from] BuildError),
}

impl Error {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    /// The collected lookup errors, if the lookup ran.
    pub fn errors(&self) -> Option<&ErrorCollection> {
        match self {
            Error::Lookup(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A specialized `Result` type for `wkd` operations.
pub type Result<T> = std::result::Result<T, Error>;

// Ergonomic "Staircase" From Implementations ---
// A macro to reduce boilerplate for converting single errors into the top-level Error.
macro_rules! impl_from_for_error {
    ($from_type:ty, $to_variant:path) => {
        impl From<$from_type> for Error {
            fn from(err: $from_type) -> Self {
                $to_variant(WkdError::from(err).into())
            }
        }
    };
}

impl From<WkdError> for Error {
    fn from(err: WkdError) -> Self {
        Error::Lookup(err.into())
    }
}

impl_from_for_error!(NetworkError, Error::Lookup);
impl_from_for_error!(DataValidationError, Error::Lookup);
impl_from_for_error!(KeyParsingError, Error::Lookup);
