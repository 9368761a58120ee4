//! Common imports for quick starts.

// Common
pub use crate::{BuildError, Error, MailAddress, Result};

// Client
pub use crate::{RequestOptions, WkdClient, WkdClientBuilder};

// Certificates supplied by a parser backend
pub use crate::{KeyParser, KeyRecord, KeyRecordIterExt, PublicKeyAlgorithm};

// Validation
pub use crate::{DiscoveryContext, KeyringValidatorBuilder, RejectionReason};
