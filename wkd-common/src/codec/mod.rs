//! Byte level encoders used by the directory protocol.
//!
//! - [`zbase32`]: the alphabet and bit-packing mandated for hashed local parts.
//! - [`crc24`]: the OpenPGP armor checksum.
//! - [`armor`]: textual rendering of a binary certificate for display.

pub mod armor;
pub mod crc24;
pub mod zbase32;
