//! Text to hex conversion for message payloads and call input.
//!
//! The chain side stores message text as hex-encoded single-byte code points,
//! so both directions are strict: `encode` rejects characters outside the
//! single-byte range instead of truncating them, and `decode` accepts exactly
//! `0x` followed by an even number of lowercase hex digits.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("hex payload is malformed")]
    MalformedHex,
    #[error("character {0:?} is outside the single-byte range")]
    UnencodableChar(char),
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encodes text as two lowercase hex digits per character, without a `0x`
/// prefix. Code points above 0xFF are an error.
pub fn encode(text: &str) -> Result<String, HexError> {
    let mut encoded = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let code = u32::from(ch);
        if code > 0xff {
            return Err(HexError::UnencodableChar(ch));
        }
        encoded.push(HEX_DIGITS[(code >> 4) as usize] as char);
        encoded.push(HEX_DIGITS[(code & 0xf) as usize] as char);
    }
    Ok(encoded)
}

/// Decodes a `0x`-prefixed hex string back to text, mapping every two-digit
/// pair to one character by numeric value. `"0x"` alone decodes to the empty
/// string.
pub fn decode(hex: &str) -> Result<String, HexError> {
    let digits = hex.strip_prefix("0x").ok_or(HexError::MalformedHex)?;
    if digits.len() % 2 != 0 {
        return Err(HexError::MalformedHex);
    }

    let mut decoded = String::with_capacity(digits.len() / 2);
    for pair in digits.as_bytes().chunks_exact(2) {
        let byte = nibble(pair[0])? << 4 | nibble(pair[1])?;
        decoded.push(char::from(byte));
    }
    Ok(decoded)
}

fn nibble(digit: u8) -> Result<u8, HexError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        _ => Err(HexError::MalformedHex),
    }
}
