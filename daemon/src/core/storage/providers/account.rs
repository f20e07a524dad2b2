use crate::core::error::BlockchainError;
use async_trait::async_trait;
use chainsim_common::{account::Account, block::BlockNumber, crypto::Address};

#[async_trait]
pub trait AccountProvider {
    // Current state of an account
    // An address never seen before is reported with zero nonce and balance
    async fn get_account(&self, address: &Address) -> Result<Account, BlockchainError>;

    // Store the account state produced by the given block
    // The balance is recorded as a new version at that block number
    async fn set_account(
        &mut self,
        account: &Account,
        block_number: BlockNumber,
    ) -> Result<(), BlockchainError>;

    // Balance of the account right after the given block
    async fn get_balance_at(
        &self,
        address: &Address,
        block_number: BlockNumber,
    ) -> Result<u64, BlockchainError>;
}
