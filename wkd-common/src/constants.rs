//! Constants used across the Web Key Directory crates.

/// Well-known path prefix under which a domain publishes its directory.
pub const WELL_KNOWN_PATH: &str = ".well-known/openpgpkey";

/// Subdomain label used by the advanced method.
pub const ADVANCED_SUBDOMAIN: &str = "openpgpkey";

/// Relative paths appended to a method's base URI.
pub mod relative_paths {
    /// Directory holding the hashed user files.
    pub const HASHED_USERS: &str = "hu";
    /// The policy flags file.
    pub const POLICY: &str = "policy";
    /// The submission address file.
    pub const SUBMISSION_ADDRESS: &str = "submission-address";
}
