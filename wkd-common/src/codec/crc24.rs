//! CRC-24 as specified for OpenPGP ASCII armor (RFC 4880, section 6.1).

use base64::{Engine, engine::general_purpose::STANDARD};

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;

/// Compute the 24-bit checksum of `data`.
pub fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for &byte in data {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}

/// The armor checksum line for `data`: `=` followed by the base64 of the
/// three checksum bytes, most significant first.
pub fn crc24_encoded(data: &[u8]) -> String {
    let crc = crc24(data);
    let bytes = [(crc >> 16) as u8, (crc >> 8) as u8, crc as u8];

    format!("={}", STANDARD.encode(bytes))
}
