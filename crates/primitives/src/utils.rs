//! Small encoding helpers used by the byte wrapper types.

use thiserror::Error;

/// Errors parsing a hex encoded fixed-size value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    Invalid(#[from] hex::FromHexError),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Lowercase hex without a prefix.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decodes a hex string, accepting an optional `0x` prefix, into an exact-size array.
pub fn decode_hex_array<const N: usize>(s: &str) -> Result<[u8; N], HexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s)?;
    let actual = bytes.len();
    <[u8; N]>::try_from(bytes).map_err(|_| HexError::Length {
        expected: N,
        actual,
    })
}
