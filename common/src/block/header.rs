use super::BlockNumber;
use crate::{
    crypto::{hash, Hash, Hashable},
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: BlockNumber,
    pub parent_hash: Hash,
    pub timestamp: TimestampMillis,
    // Gas budget the block was assembled with
    pub gas_limit: u64,
    // Sum of the gas limits of the included transactions
    pub gas_used: u64,
    // Hash over the ordered transaction ids
    pub txs_hash: Hash,
}

impl BlockHeader {
    pub fn new(
        number: BlockNumber,
        parent_hash: Hash,
        timestamp: TimestampMillis,
        gas_limit: u64,
        gas_used: u64,
        transactions: &[Hash],
    ) -> Self {
        Self {
            number,
            parent_hash,
            timestamp,
            gas_limit,
            gas_used,
            txs_hash: compute_txs_hash(transactions),
        }
    }
}

// Ordered commitment to the transaction list
// An empty list hashes to the hash of zero bytes
pub fn compute_txs_hash(transactions: &[Hash]) -> Hash {
    let mut bytes = Vec::with_capacity(transactions.len() * 32);
    for tx in transactions {
        bytes.extend_from_slice(tx.as_bytes());
    }
    hash(&bytes)
}

impl Serializer for BlockHeader {
    fn write(&self, writer: &mut Writer) {
        self.number.write(writer);
        self.parent_hash.write(writer);
        self.timestamp.write(writer);
        self.gas_limit.write(writer);
        self.gas_used.write(writer);
        self.txs_hash.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            number: u64::read(reader)?,
            parent_hash: Hash::read(reader)?,
            timestamp: u64::read(reader)?,
            gas_limit: u64::read(reader)?,
            gas_used: u64::read(reader)?,
            txs_hash: Hash::read(reader)?,
        })
    }

    fn size(&self) -> usize {
        self.number.size()
            + self.parent_hash.size()
            + self.timestamp.size()
            + self.gas_limit.size()
            + self.gas_used.size()
            + self.txs_hash.size()
    }
}

impl Hashable for BlockHeader {}
