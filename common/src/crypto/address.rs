use super::{decode_prefixed_hex, hash, CryptoError};
use crate::{
    config::{ADDRESS_SIZE, HEX_PREFIX},
    serializer::{Reader, ReaderError, Serializer, Writer},
};
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

// Account identifier, rendered as 0x-prefixed lowercase hex
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    // Burn address, nobody can send from it
    pub const fn zero() -> Self {
        Address([0; ADDRESS_SIZE])
    }

    // Deterministic address for the n-th unlocked account of a node
    // Same seed and index always give the same address
    pub fn derive(seed: &str, index: u32) -> Self {
        let mut input = Vec::with_capacity(seed.len() + 4);
        input.extend_from_slice(seed.as_bytes());
        input.extend_from_slice(&index.to_be_bytes());

        let digest = hash(&input);
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&digest.as_bytes()[..ADDRESS_SIZE]);
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDRESS_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{}{}", HEX_PREFIX, hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_prefixed_hex(s).map(Address::new)
    }
}

impl Serializer for Address {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_bytes::<ADDRESS_SIZE>().map(Address::new)
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.0);
    }

    fn size(&self) -> usize {
        ADDRESS_SIZE
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        Address::from_str(&hex).map_err(SerdeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = Address::derive("chainsim", 0);
        assert_eq!(a, Address::derive("chainsim", 0));
        assert_ne!(a, Address::derive("chainsim", 1));
        assert_ne!(a, Address::derive("other", 0));
        assert!(!a.is_zero());
    }

    #[test]
    fn test_parse_address() {
        let a = Address::derive("chainsim", 3);
        assert_eq!(Address::from_str(&a.to_string()).unwrap(), a);
        assert!(Address::from_str("0x00").is_err());
        assert!(Address::from_str(&format!("0x{}", "zz".repeat(ADDRESS_SIZE))).is_err());
    }

    #[test]
    fn test_zero_address() {
        let zero = Address::zero();
        assert!(zero.is_zero());
        assert_eq!(
            zero.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }
}
