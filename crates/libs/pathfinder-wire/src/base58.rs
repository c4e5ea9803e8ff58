//! Base58 text encoding for identifiers and timestamps.
//!
//! Two digit orders coexist on the wire and both are kept as-is:
//!
//! - [`encode_int`] / [`decode_int`] write the least-significant digit first.
//!   Timestamps travel in this form.
//! - [`encode_bytes`] / [`decode_bytes`] treat a buffer as a big-endian number
//!   and write the most-significant digit first. Protocol and message ids
//!   travel in this form.
//!
//! Neither form preserves leading zero bytes; a buffer is read purely as a
//! number.

use crate::error::WireError;

/// Digits 1-9, A-Z without `I`/`O`, a-z without `l`.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const BASE: u32 = 58;

fn digit_value(character: char, position: usize) -> Result<u8, WireError> {
    u8::try_from(character)
        .ok()
        .and_then(|byte| ALPHABET.iter().position(|&digit| digit == byte))
        .map(|index| index as u8)
        .ok_or(WireError::InvalidCharacter { character, position })
}

/// Encode an integer, least-significant digit first. Zero encodes as `"1"`.
pub fn encode_int(mut value: u64) -> String {
    if value == 0 {
        return char::from(ALPHABET[0]).to_string();
    }
    let mut text = String::new();
    while value != 0 {
        text.push(char::from(ALPHABET[(value % u64::from(BASE)) as usize]));
        value /= u64::from(BASE);
    }
    text
}

/// Decode text produced by [`encode_int`]. The empty string decodes to zero.
pub fn decode_int(text: &str) -> Result<u64, WireError> {
    let digits: Vec<(usize, char)> = text.chars().enumerate().collect();
    let mut decimal: u64 = 0;
    for &(position, character) in digits.iter().rev() {
        let digit = digit_value(character, position)?;
        decimal = decimal
            .checked_mul(u64::from(BASE))
            .and_then(|scaled| scaled.checked_add(u64::from(digit)))
            .ok_or_else(|| WireError::ValueOutOfRange(text.to_string()))?;
    }
    Ok(decimal)
}

/// Divide a big-endian number by 58 in place of a big-integer type.
/// Returns the quotient without leading zero bytes and the remainder.
fn divide_by_58(dividend: &[u8]) -> (Vec<u8>, u8) {
    let mut quotient = Vec::with_capacity(dividend.len());
    let mut remainder: u32 = 0;
    for &byte in dividend {
        let accumulator = remainder * 256 + u32::from(byte);
        let digit = accumulator / BASE;
        remainder = accumulator % BASE;
        if !quotient.is_empty() || digit != 0 {
            quotient.push(digit as u8);
        }
    }
    (quotient, remainder as u8)
}

/// Encode a big-endian byte string, most-significant digit first.
///
/// The empty buffer encodes as the empty string; any all-zero buffer encodes
/// as a single `"1"`.
pub fn encode_bytes(buf: &[u8]) -> String {
    let mut digits = Vec::new();
    let mut current = buf.to_vec();
    while !current.is_empty() {
        let (quotient, remainder) = divide_by_58(&current);
        digits.push(ALPHABET[usize::from(remainder)]);
        current = quotient;
    }
    digits.iter().rev().map(|&digit| char::from(digit)).collect()
}

/// Decode text produced by [`encode_bytes`] into the minimal big-endian
/// representation of its value. Zero decodes to an empty vector.
pub fn decode_bytes(text: &str) -> Result<Vec<u8>, WireError> {
    let mut out: Vec<u8> = Vec::new();
    for (position, character) in text.chars().enumerate() {
        let mut carry = u32::from(digit_value(character, position)?);
        for byte in out.iter_mut().rev() {
            let accumulator = u32::from(*byte) * BASE + carry;
            *byte = (accumulator & 0xFF) as u8;
            carry = accumulator >> 8;
        }
        while carry > 0 {
            out.insert(0, (carry & 0xFF) as u8);
            carry >>= 8;
        }
    }
    Ok(out)
}
