//! Successful results of the three client operations.
//!
//! Every response names the [`Method`] whose candidate produced the data.

use wkd_common::{MailAddress, Policy, PolicyParsingError};

use crate::{uri::Method, validation::RejectedKey};

/// Result of a submission-address lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAddressResponse {
    /// Method that answered.
    pub method: Method,
    /// Where key submissions for the domain are accepted.
    pub address: MailAddress,
}

/// Result of a policy lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyResponse {
    /// Method that answered.
    pub method: Method,
    /// Flags from the lines that could be applied.
    pub policy: Policy,
    /// One entry per line that could not be applied.
    pub parsing_errors: Vec<PolicyParsingError>,
}

impl PolicyResponse {
    /// Whether some lines of the policy file were skipped.
    pub fn has_parsing_errors(&self) -> bool {
        !self.parsing_errors.is_empty()
    }
}

/// Result of a key discovery.
///
/// An empty [`DiscoveryResponse::keys`] is still a successful lookup: the
/// server answered, but every key was rejected.
#[derive(Debug, Clone)]
pub struct DiscoveryResponse<K> {
    /// Method that answered.
    pub method: Method,
    /// Keys accepted by the validator chain, in server order.
    pub keys: Vec<K>,
    /// Keys refused by the validator chain, with reasons.
    pub rejected_keys: Vec<RejectedKey<K>>,
}

impl<K> DiscoveryResponse<K> {
    /// Whether some keys were refused.
    pub fn has_rejected_keys(&self) -> bool {
        !self.rejected_keys.is_empty()
    }
}
