//! ASCII armor for public key blocks.

use base64::{Engine, engine::general_purpose::STANDARD};

use super::crc24::crc24_encoded;

const BEGIN_PUBLIC_KEY: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----";
const END_PUBLIC_KEY: &str = "-----END PGP PUBLIC KEY BLOCK-----";

/// Width of the base64 body lines.
pub const LINE_WIDTH: usize = 64;

/// Wrap the base64 encoding of `bytes` at [`LINE_WIDTH`] columns.
fn base64_body(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);

    // base64 output is ASCII, so splitting on byte boundaries is safe.
    encoded
        .as_bytes()
        .chunks(LINE_WIDTH)
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the transferable public key `bytes` as an armored block, for display.
///
/// The checksum line is always emitted. Headers are never written.
pub fn armor_public_key(bytes: &[u8]) -> String {
    [
        BEGIN_PUBLIC_KEY.to_string(),
        String::new(),
        base64_body(bytes),
        crc24_encoded(bytes),
        END_PUBLIC_KEY.to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_block() {
        let armored = armor_public_key(b"123456789");

        assert_eq!(
            armored,
            "-----BEGIN PGP PUBLIC KEY BLOCK-----\n\nMTIzNDU2Nzg5\n=Ic8C\n-----END PGP PUBLIC KEY BLOCK-----"
        );
    }

    #[test]
    fn body_is_wrapped() {
        let bytes = vec![0xA5u8; 100];
        let armored = armor_public_key(&bytes);
        let lines: Vec<&str> = armored.lines().collect();

        // header, blank, 3 body lines (136 chars), checksum, footer
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[2].len(), LINE_WIDTH);
        assert_eq!(lines[3].len(), LINE_WIDTH);
        assert_eq!(lines[4].len(), 136 - 2 * LINE_WIDTH);
        assert!(lines[5].starts_with('='));
        assert_eq!(lines[6], END_PUBLIC_KEY);
    }
}
