//! z-base-32 encoding as used for WKD hashed user names.
//!
//! The alphabet and the placement of the padding bits are fixed by the
//! protocol, so the encoder is hand written instead of delegating to a
//! generic base-32 implementation.

/// The z-base-32 alphabet.
pub const ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

const SHIFT: u32 = 5;
const MASK: u32 = 0x1F;

/// Encode `data` as z-base-32.
///
/// Trailing bits that do not fill a whole 5-bit group are left-aligned and
/// zero padded. An empty input gives an empty string.
pub fn encode(data: &[u8]) -> String {
    let Some((&first, rest)) = data.split_first() else {
        return String::new();
    };

    let mut output = String::with_capacity(data.len() * 8 / 5 + 1);
    let mut buffer = u32::from(first);
    let mut bits_left = 8u32;
    let mut remaining = rest.iter();

    loop {
        if bits_left < SHIFT {
            match remaining.next() {
                Some(&byte) => {
                    buffer = (buffer << 8) | u32::from(byte);
                    bits_left += 8;
                }
                None if bits_left > 0 => {
                    let pad = SHIFT - bits_left;
                    buffer <<= pad;
                    bits_left += pad;
                }
                None => break,
            }
        }

        bits_left -= SHIFT;
        let index = (buffer >> bits_left) & MASK;
        output.push(char::from(ALPHABET[index as usize]));
    }

    output
}
