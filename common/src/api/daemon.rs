use crate::{
    account::Nonce,
    block::{Block, BlockNumber},
    crypto::{Address, Hash},
    time::TimestampMillis,
    transaction::Transaction,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

// Which state a balance query is answered against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockTag {
    // State right after the given block
    Number(BlockNumber),
    // Genesis state
    Earliest,
    // State after the top block
    #[default]
    Latest,
    // Same state as Latest: submitted but unmined transactions are not applied
    Pending,
}

impl FromStr for BlockTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = match s {
            "earliest" => return Ok(Self::Earliest),
            "latest" => return Ok(Self::Latest),
            "pending" => return Ok(Self::Pending),
            number => match number.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => number.parse(),
            },
        };

        number
            .map(Self::Number)
            .map_err(|_| format!("Invalid block tag '{}'", s))
    }
}

impl Display for BlockTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Earliest => write!(f, "earliest"),
            Self::Latest => write!(f, "latest"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Number(n) => serializer.serialize_u64(*n),
            tag => serializer.serialize_str(&tag.to_string()),
        }
    }
}

impl<'a> Deserialize<'a> for BlockTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTag {
            Number(u64),
            Text(String),
        }

        match RawTag::deserialize(deserializer)? {
            RawTag::Number(n) => Ok(Self::Number(n)),
            RawTag::Text(s) => BlockTag::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SendTransactionParams {
    pub from: Address,
    pub to: Address,
    // Next expected nonce of the sender when absent
    #[serde(default)]
    pub nonce: Option<Nonce>,
    #[serde(default)]
    pub value: u64,
    // Intrinsic gas when absent
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct GetBalanceParams {
    pub address: Address,
    #[serde(default)]
    pub block_tag: BlockTag,
}

#[derive(Serialize, Deserialize)]
pub struct GetNonceParams {
    pub address: Address,
}

#[derive(Serialize, Deserialize)]
pub struct GetBlockParams {
    pub number: BlockNumber,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockResponse {
    pub number: BlockNumber,
    pub hash: Hash,
    pub parent_hash: Hash,
    pub timestamp: TimestampMillis,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub transactions: Vec<Hash>,
}

impl From<&Block> for BlockResponse {
    fn from(block: &Block) -> Self {
        Self {
            number: block.number,
            hash: block.get_hash().clone(),
            parent_hash: block.parent_hash.clone(),
            timestamp: block.timestamp,
            gas_limit: block.gas_limit,
            gas_used: block.gas_used,
            transactions: block.get_transactions().to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct GetTransactionParams {
    pub hash: Hash,
}

// Included transaction with the block it landed in
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransactionResponse {
    pub hash: Hash,
    pub from: Address,
    pub to: Address,
    pub nonce: Nonce,
    pub value: u64,
    pub gas_limit: u64,
    pub block_number: BlockNumber,
}

impl TransactionResponse {
    pub fn new(hash: Hash, tx: &Transaction, block_number: BlockNumber) -> Self {
        Self {
            hash,
            from: *tx.get_source(),
            to: *tx.get_destination(),
            nonce: tx.get_nonce(),
            value: tx.get_value(),
            gas_limit: tx.get_gas_limit(),
            block_number,
        }
    }
}

// Value delivered to subscribers for every appended block
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewBlockEvent {
    pub number: BlockNumber,
    pub hash: Hash,
    pub txs_count: usize,
}

impl From<&Block> for NewBlockEvent {
    fn from(block: &Block) -> Self {
        Self {
            number: block.number,
            hash: block.get_hash().clone(),
            txs_count: block.get_txs_count(),
        }
    }
}
