//! The WKD hashed user name.
//!
//! SHA-1 is mandated by the directory protocol as a name mapping, not as a
//! security primitive.

use sha1::{Digest, Sha1};

use crate::codec::zbase32;

/// Hash a mail address local part into its directory file name.
///
/// The local part is lower-cased before hashing; the result is the z-base-32
/// encoding of the 20-byte SHA-1 digest (always 32 characters).
pub fn wkd_hash(local_part: &str) -> String {
    let digest = Sha1::digest(local_part.to_lowercase().as_bytes());
    zbase32::encode(&digest)
}
