mod memory;
mod providers;

pub use self::{memory::MemoryStorage, providers::*};

use crate::core::error::BlockchainError;
use async_trait::async_trait;
use chainsim_common::{
    account::Account,
    block::Block,
    crypto::Hash,
    transaction::Transaction,
};
use std::sync::Arc;

// Ledger and chain state behind a single lock of the blockchain
#[async_trait]
pub trait Storage:
    AccountProvider + BlockProvider + TransactionProvider + Sync + Send + 'static
{
    // Write everything a production cycle produced: the touched accounts,
    // the included transactions and the block itself, at the block's number.
    // Either all of it is written or nothing is.
    async fn commit_block(
        &mut self,
        block: Block,
        accounts: Vec<Account>,
        txs: Vec<(Arc<Hash>, Arc<Transaction>)>,
    ) -> Result<Arc<Block>, BlockchainError>;
}
