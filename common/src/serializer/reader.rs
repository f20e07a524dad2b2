use crate::crypto::{Hash, HASH_SIZE};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error("Invalid size")]
    InvalidSize,
    #[error("Invalid value")]
    InvalidValue,
    #[error("Invalid hex")]
    InvalidHex,
    #[error("Error while serializing: {}", _0)]
    SerializationError(String),
}

// Reader over a borrowed byte slice, tracking how much was consumed
pub struct Reader<'a> {
    bytes: &'a [u8],
    total: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, total: 0 }
    }

    pub fn read_bytes_ref(&mut self, n: usize) -> Result<&'a [u8], ReaderError> {
        if n > self.size() {
            return Err(ReaderError::InvalidSize);
        }

        let bytes = &self.bytes[self.total..self.total + n];
        self.total += n;
        Ok(bytes)
    }

    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], ReaderError> {
        let slice = self.read_bytes_ref(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }

    pub fn read_hash(&mut self) -> Result<Hash, ReaderError> {
        self.read_bytes::<HASH_SIZE>().map(Hash::new)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        let [byte] = self.read_bytes::<1>()?;
        Ok(byte)
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        self.read_bytes::<4>().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        self.read_bytes::<8>().map(u64::from_be_bytes)
    }

    // Bytes left to read
    pub fn size(&self) -> usize {
        self.bytes.len() - self.total
    }

    pub fn total_read(&self) -> usize {
        self.total
    }
}
