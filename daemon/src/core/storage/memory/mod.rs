use super::{AccountProvider, BlockProvider, Storage, TransactionProvider};
use crate::core::error::{BlockchainError, QueryError};
use async_trait::async_trait;
use chainsim_common::{
    account::{Account, Nonce},
    block::{Block, BlockNumber},
    crypto::{Address, Hash},
    transaction::Transaction,
};
use log::trace;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

// Account record with every balance version it went through
struct AccountEntry {
    nonce: Nonce,
    // {block_number} => {balance after that block}
    balances: BTreeMap<BlockNumber, u64>,
}

impl AccountEntry {
    fn last_balance(&self) -> u64 {
        self.balances
            .last_key_value()
            .map(|(_, balance)| *balance)
            .unwrap_or(0)
    }
}

// In-memory backend, the chain lives as long as the process
#[derive(Default)]
pub struct MemoryStorage {
    accounts: HashMap<Address, AccountEntry>,
    // Index is the block number
    blocks: Vec<Arc<Block>>,
    // {block_hash} => {block_number}
    blocks_by_hash: HashMap<Hash, BlockNumber>,
    // {tx_hash} => {transaction, block_number}
    executed_txs: HashMap<Hash, (Arc<Transaction>, BlockNumber)>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    // Check that the block extends the current top
    fn verify_next_block(&self, block: &Block) -> Result<(), BlockchainError> {
        let expected = self.blocks.len() as BlockNumber;
        if block.get_number() != expected {
            return Err(BlockchainError::InvalidBlockNumber {
                expected,
                got: block.get_number(),
            });
        }

        let expected_parent = match self.blocks.last() {
            Some(top) => top.get_hash().clone(),
            None => Hash::zero(),
        };
        if block.parent_hash != expected_parent {
            return Err(BlockchainError::InvalidParentHash(block.get_number()));
        }
        Ok(())
    }

    fn push_block(&mut self, block: Block) -> Arc<Block> {
        let block = Arc::new(block);
        self.blocks_by_hash
            .insert(block.get_hash().clone(), block.get_number());
        self.blocks.push(Arc::clone(&block));
        block
    }
}

#[async_trait]
impl AccountProvider for MemoryStorage {
    async fn get_account(&self, address: &Address) -> Result<Account, BlockchainError> {
        Ok(match self.accounts.get(address) {
            Some(entry) => Account {
                address: *address,
                nonce: entry.nonce,
                balance: entry.last_balance(),
            },
            None => Account::new(*address),
        })
    }

    async fn set_account(
        &mut self,
        account: &Account,
        block_number: BlockNumber,
    ) -> Result<(), BlockchainError> {
        trace!(
            "set account {} nonce {} balance {} at block {}",
            account.address,
            account.nonce,
            account.balance,
            block_number
        );
        let entry = self
            .accounts
            .entry(account.address)
            .or_insert_with(|| AccountEntry {
                nonce: 0,
                balances: BTreeMap::new(),
            });
        entry.nonce = account.nonce;
        entry.balances.insert(block_number, account.balance);
        Ok(())
    }

    async fn get_balance_at(
        &self,
        address: &Address,
        block_number: BlockNumber,
    ) -> Result<u64, BlockchainError> {
        Ok(self
            .accounts
            .get(address)
            .and_then(|entry| entry.balances.range(..=block_number).next_back())
            .map(|(_, balance)| *balance)
            .unwrap_or(0))
    }
}

#[async_trait]
impl BlockProvider for MemoryStorage {
    async fn append_block(&mut self, block: Block) -> Result<Arc<Block>, BlockchainError> {
        self.verify_next_block(&block)?;
        Ok(self.push_block(block))
    }

    async fn get_block_at(&self, number: BlockNumber) -> Result<Arc<Block>, BlockchainError> {
        self.blocks.get(number as usize).cloned().ok_or_else(|| {
            QueryError::IndexOutOfRange {
                index: number,
                length: self.blocks.len() as u64,
            }
            .into()
        })
    }

    async fn get_block_by_hash(&self, hash: &Hash) -> Result<Arc<Block>, BlockchainError> {
        let number = self
            .blocks_by_hash
            .get(hash)
            .ok_or_else(|| QueryError::BlockNotFound(hash.clone()))?;
        self.get_block_at(*number).await
    }

    async fn get_top_block(&self) -> Result<Arc<Block>, BlockchainError> {
        self.blocks
            .last()
            .cloned()
            .ok_or(BlockchainError::NoGenesisBlock)
    }

    async fn count_blocks(&self) -> u64 {
        self.blocks.len() as u64
    }
}

#[async_trait]
impl TransactionProvider for MemoryStorage {
    async fn add_executed_transaction(
        &mut self,
        hash: &Hash,
        tx: Arc<Transaction>,
        block_number: BlockNumber,
    ) -> Result<(), BlockchainError> {
        self.executed_txs.insert(hash.clone(), (tx, block_number));
        Ok(())
    }

    async fn get_executed_transaction(
        &self,
        hash: &Hash,
    ) -> Result<(Arc<Transaction>, BlockNumber), BlockchainError> {
        self.executed_txs
            .get(hash)
            .cloned()
            .ok_or_else(|| QueryError::TransactionNotFound(hash.clone()).into())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn commit_block(
        &mut self,
        block: Block,
        accounts: Vec<Account>,
        txs: Vec<(Arc<Hash>, Arc<Transaction>)>,
    ) -> Result<Arc<Block>, BlockchainError> {
        // the only failure, checked before anything is written
        self.verify_next_block(&block)?;

        let number = block.get_number();
        for account in accounts.iter() {
            self.set_account(account, number).await?;
        }
        for (hash, tx) in txs {
            self.add_executed_transaction(&hash, tx, number).await?;
        }
        Ok(self.push_block(block))
    }
}
