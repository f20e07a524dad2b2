use std::{iter::Peekable, sync::Arc};
use chainsim_common::{crypto::Hash, transaction::Transaction};

// this struct is used to store transaction with its hash and its declared gas
pub struct TxSelectorEntry<'a> {
    // Hash of the transaction
    pub hash: &'a Arc<Hash>,
    // Current transaction
    pub tx: &'a Arc<Transaction>,
    // Gas accounted against the block budget
    pub gas: u64,
}

impl PartialEq for TxSelectorEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for TxSelectorEntry<'_> {}

// TX selector is used to select transactions from the mempool
// It walks the admission ordered queue and hands out entries while
// the cumulative gas stays within the block budget.
// The first entry that does not fit ends the selection: it is never
// skipped so it stays at the head of the queue for the next block.
pub struct TxSelector<'a, I>
where
    I: Iterator<Item = (&'a Arc<Hash>, &'a Arc<Transaction>)>,
{
    queue: Peekable<I>,
    remaining_gas: u64,
    gas_used: u64,
    exhausted: bool,
}

impl<'a, I> TxSelector<'a, I>
where
    I: Iterator<Item = (&'a Arc<Hash>, &'a Arc<Transaction>)>,
{
    // Create a TxSelector over the queue with the given gas budget
    pub fn new(queue: I, gas_limit: u64) -> Self {
        Self {
            queue: queue.peekable(),
            remaining_gas: gas_limit,
            gas_used: 0,
            exhausted: false,
        }
    }

    // Get the next transaction if it still fits in the budget
    pub fn next(&mut self) -> Option<TxSelectorEntry<'a>> {
        if self.exhausted {
            return None;
        }

        let (_, tx) = self.queue.peek()?;
        let gas = tx.get_gas_limit();
        if gas > self.remaining_gas {
            self.exhausted = true;
            return None;
        }

        let (hash, tx) = self.queue.next()?;
        self.remaining_gas -= gas;
        self.gas_used += gas;
        Some(TxSelectorEntry { hash, tx, gas })
    }

    // Gas taken by the entries returned so far
    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsim_common::crypto::{Address, Hashable};

    fn queue(gas_limits: &[u64]) -> Vec<(Arc<Hash>, Arc<Transaction>)> {
        gas_limits
            .iter()
            .enumerate()
            .map(|(nonce, gas)| {
                let tx = Transaction::new(
                    Address::derive("selector", 0),
                    Address::derive("selector", 1),
                    nonce as u64,
                    0,
                    *gas,
                );
                (Arc::new(tx.hash()), Arc::new(tx))
            })
            .collect()
    }

    fn select(entries: &[(Arc<Hash>, Arc<Transaction>)], gas_limit: u64) -> Vec<u64> {
        let mut selector = TxSelector::new(entries.iter().map(|(h, t)| (h, t)), gas_limit);
        let mut nonces = Vec::new();
        while let Some(entry) = selector.next() {
            nonces.push(entry.tx.get_nonce());
        }
        nonces
    }

    #[test]
    fn test_all_fit() {
        let entries = queue(&[2_000_000, 2_000_000, 2_000_000]);
        assert_eq!(select(&entries, 6_000_000), vec![0, 1, 2]);
    }

    #[test]
    fn test_stops_at_first_overflow() {
        let entries = queue(&[2_000_000, 2_000_001, 2_000_000]);
        assert_eq!(select(&entries, 6_000_000), vec![0, 1]);
    }

    #[test]
    fn test_does_not_skip_to_smaller_entry() {
        // the third one would fit alone but the second blocks the queue
        let entries = queue(&[3_000_000, 4_000_000, 21_000]);
        assert_eq!(select(&entries, 6_000_000), vec![0]);
    }

    #[test]
    fn test_gas_used() {
        let entries = queue(&[21_000, 21_000, 21_000]);
        let mut selector = TxSelector::new(entries.iter().map(|(h, t)| (h, t)), 50_000);
        assert!(selector.next().is_some());
        assert!(selector.next().is_some());
        assert_eq!(selector.gas_used(), 42_000);
        // the third one overflows and ends the selection
        assert!(selector.next().is_none());
        assert!(selector.next().is_none());
        assert_eq!(selector.gas_used(), 42_000);
    }

    #[test]
    fn test_exact_budget_is_accepted() {
        let entries = queue(&[3_000_000, 3_000_000]);
        assert_eq!(select(&entries, 6_000_000), vec![0, 1]);
    }
}
