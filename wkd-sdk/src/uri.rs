//! Candidate URI derivation for the Advanced and Direct methods.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::Url;
use wkd_common::{
    MailAddress,
    constants::{ADVANCED_SUBDOMAIN, WELL_KNOWN_PATH, relative_paths},
    hash::wkd_hash,
};

/// Everything except the RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Which base URI convention produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// `https://openpgpkey.<domain>/.well-known/openpgpkey/<domain>/`
    Advanced,
    /// `https://<domain>/.well-known/openpgpkey/`
    Direct,
}

impl Method {
    /// Both methods, in the order they are attempted.
    pub const ALL: [Method; 2] = [Method::Advanced, Method::Direct];

    /// Message recorded when a request using this method fails.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Method::Advanced => "Advanced method failed, fall back to the direct method",
            Method::Direct => "Direct method failed",
        }
    }

    /// Base URI of this method for an already lower-cased `domain`.
    fn base_uri(self, domain: &str) -> Result<Url, url::ParseError> {
        let base = match self {
            Method::Advanced => {
                format!("https://{ADVANCED_SUBDOMAIN}.{domain}/{WELL_KNOWN_PATH}/{domain}/")
            }
            Method::Direct => format!("https://{domain}/{WELL_KNOWN_PATH}/"),
        };
        Url::parse(&base)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Advanced => f.write_str("Advanced"),
            Method::Direct => f.write_str("Direct"),
        }
    }
}

/// One location to try, together with the message to record if it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriCandidate {
    /// Method this candidate belongs to.
    pub method: Method,
    /// Absolute URI to request.
    pub uri: Url,
    /// Human-readable failure message.
    pub fallback_message: &'static str,
}

/// Candidates for the certificate of `address`, Advanced first.
pub fn key_discovery_uris(address: &MailAddress) -> Result<Vec<UriCandidate>, url::ParseError> {
    let relative = format!(
        "{}/{}?l={}",
        relative_paths::HASHED_USERS,
        wkd_hash(address.user()),
        utf8_percent_encode(address.user(), QUERY_VALUE)
    );
    candidates(address.host(), &relative)
}

/// Candidates for the policy file of `domain`, Advanced first.
pub fn policy_uris(domain: &str) -> Result<Vec<UriCandidate>, url::ParseError> {
    candidates(domain, relative_paths::POLICY)
}

/// Candidates for the submission address of `domain`, Advanced first.
pub fn submission_address_uris(domain: &str) -> Result<Vec<UriCandidate>, url::ParseError> {
    candidates(domain, relative_paths::SUBMISSION_ADDRESS)
}

fn candidates(domain: &str, relative: &str) -> Result<Vec<UriCandidate>, url::ParseError> {
    let domain = domain.to_lowercase();
    Method::ALL
        .into_iter()
        .map(|method| {
            Ok(UriCandidate {
                method,
                uri: method.base_uri(&domain)?.join(relative)?,
                fallback_message: method.fallback_message(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(s: &str) -> MailAddress {
        MailAddress::parse(s).unwrap()
    }

    #[test]
    fn key_discovery() {
        let uris = key_discovery_uris(&address("Joe.Doe@Example.ORG")).unwrap();

        assert_eq!(uris.len(), 2);
        assert_eq!(uris[0].method, Method::Advanced);
        assert_eq!(
            uris[0].uri.as_str(),
            "https://openpgpkey.example.org/.well-known/openpgpkey/example.org/hu/iy9q119eutrkn8s1mk4r39qejnbu3n5q?l=Joe.Doe"
        );
        assert_eq!(uris[1].method, Method::Direct);
        assert_eq!(
            uris[1].uri.as_str(),
            "https://example.org/.well-known/openpgpkey/hu/iy9q119eutrkn8s1mk4r39qejnbu3n5q?l=Joe.Doe"
        );
    }

    #[test]
    fn hash_ignores_case_but_query_keeps_it() {
        let lower = key_discovery_uris(&address("joe.doe@example.org")).unwrap();
        let mixed = key_discovery_uris(&address("JOE.doe@example.org")).unwrap();

        assert_eq!(lower[0].uri.path(), mixed[0].uri.path());
        assert_eq!(lower[0].uri.query(), Some("l=joe.doe"));
        assert_eq!(mixed[0].uri.query(), Some("l=JOE.doe"));
    }

    #[test]
    fn local_part_is_escaped() {
        let uris = key_discovery_uris(&address("a+b/c@example.org")).unwrap();
        assert_eq!(uris[1].uri.query(), Some("l=a%2Bb%2Fc"));
    }

    #[test]
    fn policy_and_submission_address() {
        let policy = policy_uris("Example.com").unwrap();
        assert_eq!(
            policy[0].uri.as_str(),
            "https://openpgpkey.example.com/.well-known/openpgpkey/example.com/policy"
        );
        assert_eq!(
            policy[1].uri.as_str(),
            "https://example.com/.well-known/openpgpkey/policy"
        );

        let submission = submission_address_uris("example.com").unwrap();
        assert_eq!(
            submission[0].uri.as_str(),
            "https://openpgpkey.example.com/.well-known/openpgpkey/example.com/submission-address"
        );
        assert_eq!(
            submission[1].fallback_message,
            "Direct method failed"
        );
    }

    #[test]
    fn invalid_domain_is_rejected() {
        assert!(policy_uris("exa mple.com").is_err());
    }
}
