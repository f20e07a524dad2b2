mod address;
mod hash;

pub mod error;

pub use address::*;
pub use error::CryptoError;
pub use hash::*;

// Decode a hex string with an optional 0x prefix into a fixed size array
pub(crate) fn decode_prefixed_hex<const N: usize>(value: &str) -> Result<[u8; N], CryptoError> {
    let value = value
        .strip_prefix(crate::config::HEX_PREFIX)
        .unwrap_or(value);
    if value.len() != N * 2 {
        return Err(CryptoError::InvalidLength {
            len: value.len() / 2,
            expected: N,
        });
    }

    let mut bytes = [0u8; N];
    hex::decode_to_slice(value, &mut bytes).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    Ok(bytes)
}
