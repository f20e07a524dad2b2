use super::{header::compute_txs_hash, BlockHeader, BlockNumber};
use crate::{
    crypto::{Hash, Hashable},
    serializer::{Reader, ReaderError, Serializer, Writer},
    time::TimestampMillis,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error, Formatter},
    ops::Deref,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    #[serde(flatten)]
    header: BlockHeader,
    hash: Hash,
    transactions: Vec<Hash>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Hash>) -> Self {
        let hash = header.hash();
        Block {
            header,
            hash,
            transactions,
        }
    }

    // Empty block at height 0
    pub fn genesis(timestamp: TimestampMillis, gas_limit: u64) -> Self {
        let header = BlockHeader::new(0, Hash::zero(), timestamp, gas_limit, 0, &[]);
        Self::new(header, Vec::new())
    }

    pub fn get_header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn get_hash(&self) -> &Hash {
        &self.hash
    }

    pub fn get_number(&self) -> BlockNumber {
        self.header.number
    }

    pub fn get_txs_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn get_transactions(&self) -> &[Hash] {
        &self.transactions
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl Serializer for Block {
    fn write(&self, writer: &mut Writer) {
        self.header.write(writer);
        self.transactions.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Block, ReaderError> {
        let header = BlockHeader::read(reader)?;
        let transactions = Vec::<Hash>::read(reader)?;
        if compute_txs_hash(&transactions) != header.txs_hash {
            return Err(ReaderError::InvalidValue);
        }

        Ok(Block::new(header, transactions))
    }

    fn size(&self) -> usize {
        self.header.size() + self.transactions.size()
    }
}

impl Deref for Block {
    type Target = BlockHeader;

    fn deref(&self) -> &Self::Target {
        self.get_header()
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let txs: Vec<String> = self.transactions.iter().map(|h| h.to_string()).collect();
        write!(
            f,
            "Block[number: {}, hash: {}, parent: {}, timestamp: {}, gas_used: {}/{}, txs: [{}]]",
            self.number,
            self.hash,
            self.parent_hash,
            self.timestamp,
            self.gas_used,
            self.gas_limit,
            txs.join(", ")
        )
    }
}
