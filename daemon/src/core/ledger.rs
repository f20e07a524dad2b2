use super::{
    error::{BlockchainError, InclusionError},
    storage::AccountProvider,
};
use chainsim_common::{
    account::Account,
    block::GENESIS_BLOCK_NUMBER,
    crypto::Address,
    transaction::Transaction,
};
use indexmap::IndexMap;
use log::{debug, trace};

// Current state of an account, zeroed on first reference
pub async fn get_account<P: AccountProvider + ?Sized>(
    provider: &P,
    address: &Address,
) -> Result<Account, BlockchainError> {
    provider.get_account(address).await
}

// Write the genesis allocations at block 0
pub async fn allocate_genesis<P: AccountProvider + ?Sized>(
    provider: &mut P,
    allocations: impl IntoIterator<Item = (Address, u64)>,
) -> Result<(), BlockchainError> {
    for (address, balance) in allocations {
        debug!("genesis allocation: {} => {}", address, balance);
        provider
            .set_account(
                &Account::with_balance(address, balance),
                GENESIS_BLOCK_NUMBER,
            )
            .await?;
    }
    Ok(())
}

// Account changes of the block being assembled
// Reads go through to the provider for accounts not touched yet,
// nothing is written until the block is committed.
#[derive(Default)]
pub struct LedgerChanges {
    accounts: IndexMap<Address, Account>,
}

impl LedgerChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_account<P: AccountProvider + ?Sized>(
        &self,
        provider: &P,
        address: &Address,
    ) -> Result<Account, BlockchainError> {
        match self.accounts.get(address) {
            Some(account) => Ok(account.clone()),
            None => provider.get_account(address).await,
        }
    }

    // Apply a transfer on top of the changes made so far
    // Increments the sender nonce and moves the value to the recipient.
    // Nothing is changed when it fails.
    pub async fn apply_transfer<P: AccountProvider + ?Sized>(
        &mut self,
        provider: &P,
        tx: &Transaction,
    ) -> Result<(), BlockchainError> {
        let mut sender = self.get_account(provider, tx.get_source()).await?;

        // A transaction stranded behind a dropped one from the same sender
        if sender.nonce != tx.get_nonce() {
            return Err(InclusionError::NonceMismatch {
                expected: sender.nonce,
                got: tx.get_nonce(),
            }
            .into());
        }

        if !sender.can_spend(tx.get_value()) {
            return Err(InclusionError::InsufficientBalance {
                need: tx.get_value(),
                have: sender.balance,
            }
            .into());
        }

        if tx.get_source() == tx.get_destination() {
            sender.nonce += 1;
            self.accounts.insert(sender.address, sender);
            return Ok(());
        }

        let mut recipient = self.get_account(provider, tx.get_destination()).await?;
        recipient.balance = recipient
            .balance
            .checked_add(tx.get_value())
            .ok_or(InclusionError::BalanceOverflow(*tx.get_destination()))?;
        sender.balance -= tx.get_value();
        sender.nonce += 1;

        trace!(
            "transfer {} from {} to {}",
            tx.get_value(),
            sender.address,
            recipient.address
        );
        self.accounts.insert(sender.address, sender);
        self.accounts.insert(recipient.address, recipient);
        Ok(())
    }

    // Touched accounts in first-touch order
    pub fn into_accounts(self) -> Vec<Account> {
        self.accounts.into_values().collect()
    }
}
