use thiserror::Error;

/// Errors that can occur while parsing hashes and addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid hexadecimal string format
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// Decoded value has the wrong byte length
    #[error("Invalid length: {len} bytes, expected: {expected} bytes")]
    InvalidLength { len: usize, expected: usize },
}
