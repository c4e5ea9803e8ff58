//! Fixed-width big-endian length fields.

use crate::error::WireError;

/// Size of every length field embedded in a frame.
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Encode `value` as exactly four big-endian bytes.
pub fn encode_u32be(value: u64) -> Result<[u8; LENGTH_FIELD_SIZE], WireError> {
    let value = u32::try_from(value).map_err(|_| WireError::ValueOutOfRange(value.to_string()))?;
    Ok(value.to_be_bytes())
}

/// Encode a buffer length as a length field.
pub fn encode_len(len: usize) -> Result<[u8; LENGTH_FIELD_SIZE], WireError> {
    encode_u32be(len as u64)
}

/// Decode a length field. `bytes` must be exactly four bytes long.
pub fn decode_u32be(bytes: &[u8]) -> Result<u32, WireError> {
    let field: [u8; LENGTH_FIELD_SIZE] = bytes.try_into().map_err(|_| {
        WireError::InvalidLength { needed: LENGTH_FIELD_SIZE, available: bytes.len() }
    })?;
    Ok(u32::from_be_bytes(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_big_endian() {
        assert_eq!(encode_u32be(0).expect("in range"), [0, 0, 0, 0]);
        assert_eq!(encode_u32be(4).expect("in range"), [0, 0, 0, 4]);
        assert_eq!(encode_u32be(0xFF00_0004).expect("in range"), [0xFF, 0, 0, 4]);
        assert_eq!(encode_u32be(u64::from(u32::MAX)).expect("in range"), [0xFF; 4]);
    }

    #[test]
    fn decodes_big_endian() {
        assert_eq!(decode_u32be(b"\xFF\x00\x00\x04").expect("four bytes"), 4_278_190_084);
        assert_eq!(decode_u32be(&[0, 0, 1, 0]).expect("four bytes"), 256);
    }

    #[test]
    fn rejects_values_above_u32() {
        let too_big = u64::from(u32::MAX) + 1;
        assert!(matches!(encode_u32be(too_big), Err(WireError::ValueOutOfRange(v)) if v == too_big.to_string()));
    }

    #[test]
    fn rejects_wrong_field_width() {
        assert!(matches!(
            decode_u32be(&[0, 1, 2]),
            Err(WireError::InvalidLength { needed: 4, available: 3 })
        ));
        assert!(matches!(
            decode_u32be(&[0, 1, 2, 3, 4]),
            Err(WireError::InvalidLength { needed: 4, available: 5 })
        ));
    }

    #[test]
    fn roundtrips_edge_values() {
        for value in [0u64, 1, 57, 58, 255, 256, 65_535, 65_536, 1 << 31, u64::from(u32::MAX)] {
            let encoded = encode_u32be(value).expect("in range");
            assert_eq!(u64::from(decode_u32be(&encoded).expect("four bytes")), value);
        }
    }
}
