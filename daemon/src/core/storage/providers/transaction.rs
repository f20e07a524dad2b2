use crate::core::error::BlockchainError;
use async_trait::async_trait;
use chainsim_common::{block::BlockNumber, crypto::Hash, transaction::Transaction};
use std::sync::Arc;

#[async_trait]
pub trait TransactionProvider {
    // Mark a transaction as included in the given block
    async fn add_executed_transaction(
        &mut self,
        hash: &Hash,
        tx: Arc<Transaction>,
        block_number: BlockNumber,
    ) -> Result<(), BlockchainError>;

    // Included transaction with the block number it landed in
    async fn get_executed_transaction(
        &self,
        hash: &Hash,
    ) -> Result<(Arc<Transaction>, BlockNumber), BlockchainError>;
}
