use crate::core::error::BlockchainError;
use async_trait::async_trait;
use chainsim_common::{
    block::{Block, BlockNumber},
    crypto::Hash,
};
use std::sync::Arc;

#[async_trait]
pub trait BlockProvider {
    // Append a block at the top of the chain
    // Its number must be the current length and its parent the top block
    async fn append_block(&mut self, block: Block) -> Result<Arc<Block>, BlockchainError>;

    // Block at the given index, IndexOutOfRange when index >= length
    async fn get_block_at(&self, number: BlockNumber) -> Result<Arc<Block>, BlockchainError>;

    async fn get_block_by_hash(&self, hash: &Hash) -> Result<Arc<Block>, BlockchainError>;

    async fn get_top_block(&self) -> Result<Arc<Block>, BlockchainError>;

    // Number of blocks appended, genesis included
    async fn count_blocks(&self) -> u64;
}
