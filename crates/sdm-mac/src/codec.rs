//! Hex conversions between URL parameters and raw bytes.

use crate::error::{Result, SdmError};

/// Decode a hex string into bytes.
///
/// Odd-length input or any non-hex character is rejected.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    hex::decode(hex).map_err(|source| SdmError::InvalidHex {
        field: "value",
        source,
    })
}

/// Encode bytes as uppercase hex, two characters per byte, no separators.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Decode a hex field that must be exactly `N` bytes long.
///
/// The length is checked before the characters, so a short value reports
/// `InvalidLength` even when it is also not hex.
pub fn decode_fixed<const N: usize>(field: &'static str, hex: &str) -> Result<[u8; N]> {
    if hex.len() != N * 2 {
        return Err(SdmError::InvalidLength {
            field,
            expected: N * 2,
            got: hex.len(),
        });
    }

    let mut out = [0u8; N];
    hex::decode_to_slice(hex, &mut out).map_err(|source| SdmError::InvalidHex { field, source })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_bytes() {
        assert_eq!(hex_to_bytes("3CC3").unwrap(), vec![0x3C, 0xC3]);
        assert_eq!(hex_to_bytes("3cc3").unwrap(), vec![0x3C, 0xC3]);
        assert!(hex_to_bytes("").unwrap().is_empty());
    }

    #[test]
    fn test_hex_to_bytes_rejects_odd_length() {
        let result = hex_to_bytes("ABC");
        assert!(matches!(result, Err(SdmError::InvalidHex { .. })));
    }

    #[test]
    fn test_hex_to_bytes_rejects_non_hex() {
        let result = hex_to_bytes("ZZ");
        assert!(matches!(result, Err(SdmError::InvalidHex { .. })));
    }

    #[test]
    fn test_bytes_to_hex_is_uppercase() {
        assert_eq!(bytes_to_hex(&[0x0a, 0xbc, 0x00, 0xff]), "0ABC00FF");
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn test_decode_fixed() {
        let uid = decode_fixed::<7>("uid", "04112233445566").unwrap();
        assert_eq!(uid, [0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    }

    #[test]
    fn test_decode_fixed_wrong_length() {
        let result = decode_fixed::<7>("uid", "0411223344556");
        assert!(matches!(
            result,
            Err(SdmError::InvalidLength {
                field: "uid",
                expected: 14,
                got: 13
            })
        ));
    }

    #[test]
    fn test_decode_fixed_bad_characters() {
        let result = decode_fixed::<3>("ctr", "00000G");
        assert!(matches!(result, Err(SdmError::InvalidHex { field: "ctr", .. })));
    }
}
