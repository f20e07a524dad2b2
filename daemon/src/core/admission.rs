use super::{
    error::{AdmissionError, BlockchainError},
    mempool::Mempool,
    storage::AccountProvider,
};
use chainsim_common::{
    account::Nonce,
    config::INTRINSIC_GAS,
    crypto::Address,
    transaction::Transaction,
};
use log::debug;
use std::collections::HashSet;

// Synchronous checks run on every submitted transaction
// A rejected transaction is never queued
pub struct AdmissionFilter {
    // Accounts the node can send from
    unlocked: HashSet<Address>,
    block_gas_limit: u64,
}

impl AdmissionFilter {
    pub fn new(unlocked: impl IntoIterator<Item = Address>, block_gas_limit: u64) -> Self {
        Self {
            unlocked: unlocked.into_iter().collect(),
            block_gas_limit,
        }
    }

    pub fn is_unlocked(&self, address: &Address) -> bool {
        self.unlocked.contains(address)
    }

    // Nonce the next transaction of `sender` must carry
    // Pending transactions come first, the ledger is used when none are queued
    pub async fn get_expected_nonce<P: AccountProvider + ?Sized>(
        provider: &P,
        mempool: &Mempool,
        sender: &Address,
    ) -> Result<Nonce, BlockchainError> {
        if let Some(nonce) = mempool.get_next_nonce(sender) {
            return Ok(nonce);
        }
        Ok(provider.get_account(sender).await?.nonce)
    }

    // Run every check in order and stop at the first failure
    pub async fn verify<P: AccountProvider + ?Sized>(
        &self,
        provider: &P,
        mempool: &Mempool,
        tx: &Transaction,
    ) -> Result<(), BlockchainError> {
        let sender = tx.get_source();
        if !self.is_unlocked(sender) {
            return Err(AdmissionError::InvalidSender(*sender).into());
        }

        let gas_limit = tx.get_gas_limit();
        if gas_limit < INTRINSIC_GAS {
            return Err(AdmissionError::IntrinsicGasTooLow {
                gas_limit,
                required: INTRINSIC_GAS,
            }
            .into());
        }

        if gas_limit > self.block_gas_limit {
            return Err(AdmissionError::ExceedsBlockGasLimit {
                gas_limit,
                block_gas_limit: self.block_gas_limit,
            }
            .into());
        }

        let expected = Self::get_expected_nonce(provider, mempool, sender).await?;
        if tx.get_nonce() != expected {
            debug!(
                "rejecting tx from {}: expected nonce {} got {}",
                sender,
                expected,
                tx.get_nonce()
            );
            return Err(AdmissionError::NonceMismatch {
                expected,
                got: tx.get_nonce(),
            }
            .into());
        }

        // Pending spends are not deducted, inclusion runs the final check
        let balance = provider.get_account(sender).await?.balance;
        if tx.get_value() > balance {
            return Err(AdmissionError::InsufficientFunds {
                cost: tx.get_value(),
                balance,
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ledger, storage::MemoryStorage};
    use chainsim_common::crypto::Hashable;
    use std::sync::Arc;

    const BLOCK_GAS_LIMIT: u64 = 6_000_000;

    fn alice() -> Address {
        Address::derive("admission", 0)
    }

    fn bob() -> Address {
        Address::derive("admission", 1)
    }

    async fn setup() -> (MemoryStorage, Mempool, AdmissionFilter) {
        let mut storage = MemoryStorage::new();
        ledger::allocate_genesis(&mut storage, [(alice(), 1_000)])
            .await
            .unwrap();
        let filter = AdmissionFilter::new([alice()], BLOCK_GAS_LIMIT);
        (storage, Mempool::new(), filter)
    }

    async fn check(tx: Transaction) -> Result<(), BlockchainError> {
        let (storage, mempool, filter) = setup().await;
        filter.verify(&storage, &mempool, &tx).await
    }

    #[tokio::test]
    async fn test_unknown_sender() {
        let err = check(Transaction::new(bob(), alice(), 0, 1, 21_000))
            .await
            .unwrap_err();
        assert_eq!(err, BlockchainError::from(AdmissionError::InvalidSender(bob())));
        assert_eq!(err.to_string(), "sender account not recognized");
    }

    #[tokio::test]
    async fn test_gas_bounds() {
        let err = check(Transaction::new(alice(), bob(), 0, 1, 20_999))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "intrinsic gas too low");

        let err = check(Transaction::new(alice(), bob(), 0, 1, BLOCK_GAS_LIMIT + 1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Exceeds block gas limit");

        assert!(check(Transaction::new(alice(), bob(), 0, 1, BLOCK_GAS_LIMIT))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_wrong_nonce_message() {
        let err = check(Transaction::new(alice(), bob(), 1, 1, 21_000))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "the tx doesn't have the correct nonce. account has nonce of: 0 tx has nonce of: 1"
        );
    }

    #[tokio::test]
    async fn test_nonce_follows_pending_pool() {
        let (storage, mut mempool, filter) = setup().await;
        for nonce in 0..3 {
            let tx = Transaction::new(alice(), bob(), nonce, 1, 21_000);
            filter.verify(&storage, &mempool, &tx).await.unwrap();
            mempool.add_tx(tx.hash(), Arc::new(tx));
        }

        let replay = Transaction::new(alice(), bob(), 1, 1, 21_000);
        assert_eq!(
            filter.verify(&storage, &mempool, &replay).await,
            Err(BlockchainError::Admission(AdmissionError::NonceMismatch {
                expected: 3,
                got: 1
            }))
        );
    }

    #[tokio::test]
    async fn test_value_above_balance() {
        let err = check(Transaction::new(alice(), bob(), 0, 1_001, 21_000))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "sender doesn't have enough funds to send tx. The upfront cost is: 1001 and the sender's account only has: 1000"
        );
    }
}
