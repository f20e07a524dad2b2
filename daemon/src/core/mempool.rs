use super::tx_selector::TxSelector;
use chainsim_common::{
    account::Nonce,
    crypto::{Address, Hash},
    transaction::Transaction,
};
use indexmap::IndexMap;
use log::{debug, trace};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

// Pending transactions of a single sender, ordered by nonce
#[derive(Default)]
pub struct AccountCache {
    // lowest nonce still pending
    min: Nonce,
    // highest nonce still pending
    max: Nonce,
    // transactions hashes in nonce order
    txs: VecDeque<Arc<Hash>>,
}

impl AccountCache {
    fn push(&mut self, nonce: Nonce, hash: Arc<Hash>) {
        if self.txs.is_empty() {
            self.min = nonce;
        }
        self.max = nonce;
        self.txs.push_back(hash);
    }

    // Remove the head of the sequence, returns true if it is now empty
    fn pop_front(&mut self, hash: &Hash) -> bool {
        if let Some(pos) = self.txs.iter().position(|h| **h == *hash) {
            self.txs.remove(pos);
        }

        if self.txs.is_empty() {
            return true;
        }
        self.min += 1;
        false
    }
}

// Admitted transactions waiting to be included in a block
// The queue keeps admission order, it is the order used for packing.
#[derive(Default)]
pub struct Mempool {
    // store all txs waiting to be included in a block
    txs: IndexMap<Arc<Hash>, Arc<Transaction>>,
    // pending sequences per sender
    caches: HashMap<Address, AccountCache>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    // Append an admitted transaction at the tail of the queue
    // The nonce checks are done by the admission filter before this call
    pub fn add_tx(&mut self, hash: Hash, tx: Arc<Transaction>) {
        self.push(Arc::new(hash), tx);
    }

    fn push(&mut self, hash: Arc<Hash>, tx: Arc<Transaction>) {
        let nonce = tx.get_nonce();
        let sender = *tx.get_source();

        trace!("add tx {} from {} with nonce {}", hash, sender, nonce);
        self.caches
            .entry(sender)
            .or_default()
            .push(nonce, Arc::clone(&hash));
        self.txs.insert(hash, tx);
    }

    // Remove from the head the longest prefix whose summed gas fits in `gas_limit`
    // The first transaction that does not fit stays at the head with everything behind it
    pub fn drain_up_to(&mut self, gas_limit: u64) -> Vec<(Arc<Hash>, Arc<Transaction>)> {
        let count = {
            let mut selector = TxSelector::new(self.txs.iter(), gas_limit);
            let mut count = 0;
            while selector.next().is_some() {
                count += 1;
            }
            debug!(
                "selected {} txs using {} gas out of {}",
                count,
                selector.gas_used(),
                gas_limit
            );
            count
        };

        let drained: Vec<(Arc<Hash>, Arc<Transaction>)> = self.txs.drain(..count).collect();

        for (hash, tx) in drained.iter() {
            let sender = tx.get_source();
            let empty = match self.caches.get_mut(sender) {
                Some(cache) => cache.pop_front(hash),
                None => false,
            };
            if empty {
                trace!("no more pending txs for {}", sender);
                self.caches.remove(sender);
            }
        }

        drained
    }

    // Put drained transactions back at the head of the queue, in their drained order
    pub fn restore(&mut self, drained: Vec<(Arc<Hash>, Arc<Transaction>)>) {
        if drained.is_empty() {
            return;
        }

        debug!("restoring {} txs at the head of the queue", drained.len());
        let tail = std::mem::take(&mut self.txs);
        self.caches.clear();
        for (hash, tx) in drained.into_iter().chain(tail) {
            self.push(hash, tx);
        }
    }

    // Remove every pending transaction of a sender, returns how many were removed
    // Used once the sender's sequence is broken and nothing queued can follow
    pub fn remove_txs_from(&mut self, sender: &Address) -> usize {
        let Some(cache) = self.caches.remove(sender) else {
            return 0;
        };

        for hash in cache.txs.iter() {
            trace!("removing tx {} from {}", hash, sender);
            self.txs.shift_remove(hash);
        }
        cache.txs.len()
    }

    // Next nonce a new transaction from this sender must carry, if it has pending ones
    pub fn get_next_nonce(&self, sender: &Address) -> Option<Nonce> {
        self.caches.get(sender).map(|cache| cache.max + 1)
    }

    // Hashes in queue order
    pub fn get_txs_hashes(&self) -> Vec<Hash> {
        self.txs.keys().map(|hash| Hash::clone(hash)).collect()
    }

    pub fn size(&self) -> usize {
        self.txs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsim_common::crypto::Hashable;

    fn push(mempool: &mut Mempool, sender: u32, nonce: Nonce, gas: u64) -> Hash {
        let tx = Transaction::new(
            Address::derive("mempool", sender),
            Address::derive("mempool", 99),
            nonce,
            1,
            gas,
        );
        let hash = tx.hash();
        mempool.add_tx(hash.clone(), Arc::new(tx));
        hash
    }

    fn nonce_range(mempool: &Mempool, sender: u32) -> Option<(Nonce, Nonce)> {
        mempool
            .caches
            .get(&Address::derive("mempool", sender))
            .map(|cache| (cache.min, cache.max))
    }

    #[test]
    fn test_next_nonce_follows_pending() {
        let mut mempool = Mempool::new();
        let sender = Address::derive("mempool", 0);
        assert_eq!(mempool.get_next_nonce(&sender), None);

        push(&mut mempool, 0, 4, 21_000);
        push(&mut mempool, 0, 5, 21_000);
        assert_eq!(mempool.get_next_nonce(&sender), Some(6));
        assert_eq!(nonce_range(&mempool, 0), Some((4, 5)));
    }

    #[test]
    fn test_drain_keeps_admission_order() {
        let mut mempool = Mempool::new();
        let a = push(&mut mempool, 0, 0, 21_000);
        let b = push(&mut mempool, 1, 0, 21_000);
        let c = push(&mut mempool, 0, 1, 21_000);

        let drained: Vec<Hash> = mempool
            .drain_up_to(6_000_000)
            .into_iter()
            .map(|(hash, _)| Hash::clone(&hash))
            .collect();
        assert_eq!(drained, vec![a, b, c]);
        assert_eq!(mempool.size(), 0);
        assert!(mempool.caches.is_empty());
    }

    #[test]
    fn test_drain_leaves_overflowing_tail() {
        let mut mempool = Mempool::new();
        push(&mut mempool, 0, 0, 2_000_000);
        push(&mut mempool, 0, 1, 2_000_001);
        let third = push(&mut mempool, 0, 2, 2_000_000);

        // 2_000_000 + 2_000_001 + 2_000_000 > 6_000_000
        let drained = mempool.drain_up_to(6_000_000);
        assert_eq!(
            drained.iter().map(|(_, tx)| tx.get_nonce()).collect::<Vec<_>>(),
            vec![0, 1]
        );

        assert_eq!(mempool.size(), 1);
        assert_eq!(mempool.get_txs_hashes(), vec![third]);
        assert_eq!(nonce_range(&mempool, 0), Some((2, 2)));
        let sender = Address::derive("mempool", 0);
        assert_eq!(mempool.get_next_nonce(&sender), Some(3));
    }

    #[test]
    fn test_drain_with_no_room() {
        let mut mempool = Mempool::new();
        push(&mut mempool, 0, 0, 30_000);
        assert!(mempool.drain_up_to(21_000).is_empty());
        assert_eq!(mempool.size(), 1);
    }

    #[test]
    fn test_restore_puts_drained_back_at_head() {
        let mut mempool = Mempool::new();
        let first = push(&mut mempool, 0, 0, 3_000_000);
        let second = push(&mut mempool, 1, 0, 3_000_000);
        let third = push(&mut mempool, 0, 1, 3_000_000);

        let drained = mempool.drain_up_to(6_000_000);
        assert_eq!(mempool.get_txs_hashes(), vec![third.clone()]);

        mempool.restore(drained);
        assert_eq!(mempool.get_txs_hashes(), vec![first, second, third]);
        assert_eq!(nonce_range(&mempool, 0), Some((0, 1)));
        assert_eq!(nonce_range(&mempool, 1), Some((0, 0)));
    }

    #[test]
    fn test_remove_txs_from_sender() {
        let mut mempool = Mempool::new();
        push(&mut mempool, 0, 3, 21_000);
        let other = push(&mut mempool, 1, 0, 21_000);
        push(&mut mempool, 0, 4, 21_000);

        let sender = Address::derive("mempool", 0);
        assert_eq!(mempool.remove_txs_from(&sender), 2);
        assert_eq!(mempool.get_txs_hashes(), vec![other]);
        assert_eq!(mempool.get_next_nonce(&sender), None);
        assert_eq!(mempool.remove_txs_from(&sender), 0);
    }
}
