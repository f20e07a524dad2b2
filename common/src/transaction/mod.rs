use crate::{
    account::Nonce,
    crypto::{Address, Hashable},
    serializer::{Reader, ReaderError, Serializer, Writer},
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// Value transfer between two accounts
// Immutable once built, the hash covers every field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    source: Address,
    destination: Address,
    nonce: Nonce,
    value: u64,
    gas_limit: u64,
}

impl Transaction {
    pub fn new(
        source: Address,
        destination: Address,
        nonce: Nonce,
        value: u64,
        gas_limit: u64,
    ) -> Self {
        Self {
            source,
            destination,
            nonce,
            value,
            gas_limit,
        }
    }

    pub fn get_source(&self) -> &Address {
        &self.source
    }

    pub fn get_destination(&self) -> &Address {
        &self.destination
    }

    pub fn get_nonce(&self) -> Nonce {
        self.nonce
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_gas_limit(&self) -> u64 {
        self.gas_limit
    }
}

impl Serializer for Transaction {
    fn write(&self, writer: &mut Writer) {
        self.source.write(writer);
        self.destination.write(writer);
        self.nonce.write(writer);
        self.value.write(writer);
        self.gas_limit.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            source: Address::read(reader)?,
            destination: Address::read(reader)?,
            nonce: u64::read(reader)?,
            value: u64::read(reader)?,
            gas_limit: u64::read(reader)?,
        })
    }

    fn size(&self) -> usize {
        self.source.size()
            + self.destination.size()
            + self.nonce.size()
            + self.value.size()
            + self.gas_limit.size()
    }
}

impl Hashable for Transaction {}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transaction[from: {}, to: {}, nonce: {}, value: {}, gas_limit: {}]",
            self.source, self.destination, self.nonce, self.value, self.gas_limit
        )
    }
}
