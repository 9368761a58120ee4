#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

mod client;
pub mod errors;
mod http;
pub mod keys;
mod macros;
pub mod responses;
pub mod retrieval;
pub mod transport;
pub mod uri;
mod util;
pub mod validation;

pub mod prelude;

// --- PUBLIC API EXPORTS ---
// Client
pub use client::{DEFAULT_REQUEST_TIMEOUT, WkdClient, WkdClientBuilder};
// Transport
pub use http::ReqwestTransport;
pub use retrieval::{RequestOptions, Retrieved};
pub use transport::{TransportError, WkdTransport};
pub use uri::{Method, UriCandidate};

// Errors
pub use errors::{
    BuildError, DataValidationError, Error, ErrorCollection, KeyParsingError, NetworkError,
    Result, WkdError,
};

// Keys and validation
pub use keys::{KeyParser, KeyRecord, KeyRecordIterExt, PublicKeyAlgorithm};
pub use responses::{DiscoveryResponse, PolicyResponse, SubmissionAddressResponse};
pub use validation::{
    DiscoveryContext, KeyValidator, KeyringValidator, KeyringValidatorBuilder, RejectedKey,
    RejectionReason, ValidationOutcome,
};

// Re-exports
pub use reqwest::StatusCode;
pub use tokio_util::sync::CancellationToken;
pub use wkd_common::{MailAddress, Policy, PolicyParsingError};
