use crate::crypto::Address;
use serde::{Deserialize, Serialize};

pub type Nonce = u64;

// Ledger view of a single address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    // Count of transactions from this address included in blocks
    pub nonce: Nonce,
    pub balance: u64,
}

impl Account {
    // Fresh account as seen on first reference
    pub fn new(address: Address) -> Self {
        Self {
            address,
            nonce: 0,
            balance: 0,
        }
    }

    pub fn with_balance(address: Address, balance: u64) -> Self {
        Self {
            address,
            nonce: 0,
            balance,
        }
    }

    pub fn can_spend(&self, amount: u64) -> bool {
        self.balance >= amount
    }
}
