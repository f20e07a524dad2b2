use super::{
    admission::AdmissionFilter,
    assembler::{AssemblerState, BlockAssembler},
    clock::Clock,
    config::Config,
    error::{BlockchainError, QueryError},
    ledger::{self, LedgerChanges},
    mempool::Mempool,
    notifier::{EventNotifier, Subscription, SubscriptionId},
    storage::Storage,
};
use chainsim_common::{
    account::{Account, Nonce},
    api::daemon::{BlockTag, NewBlockEvent},
    block::{Block, BlockHeader, BlockNumber, GENESIS_BLOCK_NUMBER},
    crypto::{Address, Hash, Hashable},
    tokio::sync::{Mutex, RwLock},
    transaction::Transaction,
};
use log::{debug, error, info, trace, warn};
use metrics::{counter, gauge};
use std::{collections::HashSet, sync::Arc};

pub struct Blockchain<S: Storage> {
    // ledger and chain, always locked before the mempool
    storage: RwLock<S>,
    mempool: RwLock<Mempool>,
    admission: AdmissionFilter,
    assembler: BlockAssembler,
    notifier: Mutex<EventNotifier>,
    clock: Arc<dyn Clock>,
    config: Config,
    // unlocked accounts in derivation order
    accounts: Vec<Address>,
}

impl<S: Storage> Blockchain<S> {
    // Create the chain on an empty storage
    // Funds the unlocked accounts and appends the genesis block
    pub async fn new(
        config: Config,
        mut storage: S,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>, BlockchainError> {
        config.validate()?;

        if storage.count_blocks().await > 0 {
            return Err(BlockchainError::GenesisAlreadyExists);
        }

        let accounts = config.unlocked_accounts();
        ledger::allocate_genesis(
            &mut storage,
            accounts
                .iter()
                .map(|address| (*address, config.initial_balance)),
        )
        .await?;

        let genesis = Block::genesis(clock.now_millis(), config.block_gas_limit);
        let genesis = storage.append_block(genesis).await?;
        if log::log_enabled!(log::Level::Info) {
            info!(
                "Genesis block {} created with {} funded accounts",
                genesis.get_hash(),
                accounts.len()
            );
        }

        Ok(Arc::new(Self {
            storage: RwLock::new(storage),
            mempool: RwLock::new(Mempool::new()),
            admission: AdmissionFilter::new(accounts.iter().copied(), config.block_gas_limit),
            assembler: BlockAssembler::new(),
            notifier: Mutex::new(EventNotifier::new()),
            clock,
            config,
            accounts,
        }))
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_accounts(&self) -> &[Address] {
        &self.accounts
    }

    pub fn get_assembler_state(&self) -> AssemblerState {
        self.assembler.get_state()
    }

    // Verify and enqueue a transaction, returns its hash
    pub async fn add_tx_to_mempool(&self, tx: Transaction) -> Result<Hash, BlockchainError> {
        let storage = self.storage.read().await;
        let mut mempool = self.mempool.write().await;
        self.admit(&*storage, &mut mempool, tx).await
    }

    // Build a transfer from `from` and enqueue it
    // Without a nonce, the next expected one is taken under the same locks as the admission
    pub async fn send_transfer(
        &self,
        from: Address,
        to: Address,
        nonce: Option<Nonce>,
        value: u64,
        gas_limit: u64,
    ) -> Result<Hash, BlockchainError> {
        let storage = self.storage.read().await;
        let mut mempool = self.mempool.write().await;
        let nonce = match nonce {
            Some(nonce) => nonce,
            None => AdmissionFilter::get_expected_nonce(&*storage, &mempool, &from).await?,
        };
        let tx = Transaction::new(from, to, nonce, value, gas_limit);
        self.admit(&*storage, &mut mempool, tx).await
    }

    async fn admit(
        &self,
        storage: &S,
        mempool: &mut Mempool,
        tx: Transaction,
    ) -> Result<Hash, BlockchainError> {
        if let Err(e) = self.admission.verify(storage, mempool, &tx).await {
            counter!("chainsim_txs_rejected").increment(1);
            if log::log_enabled!(log::Level::Debug) {
                debug!("Transaction from {} rejected: {}", tx.get_source(), e);
            }
            return Err(e);
        }

        let hash = tx.hash();
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Transaction {} admitted from {} with nonce {}",
                hash,
                tx.get_source(),
                tx.get_nonce()
            );
        }
        mempool.add_tx(hash.clone(), Arc::new(tx));

        counter!("chainsim_txs_admitted").increment(1);
        gauge!("chainsim_mempool_size").set(mempool.size() as f64);
        Ok(hash)
    }

    // Run one assembly cycle and return the appended block
    // Transactions failing at inclusion are dropped and the block is produced anyway
    pub async fn produce_block(&self) -> Result<Arc<Block>, BlockchainError> {
        let cycle = self.assembler.begin().await;

        let block = {
            let mut storage = self.storage.write().await;
            let drained = {
                let mut mempool = self.mempool.write().await;
                mempool.drain_up_to(self.config.block_gas_limit)
            };

            cycle.transition(AssemblerState::Applying);
            let result = self.assemble_block(&mut *storage, &drained).await;

            let mut mempool = self.mempool.write().await;
            let block = match result {
                Ok((block, broken_senders)) => {
                    // queued transactions of these senders can never follow the dropped one
                    for sender in broken_senders {
                        let removed = mempool.remove_txs_from(&sender);
                        if removed > 0 {
                            counter!("chainsim_txs_dropped").increment(removed as u64);
                            if log::log_enabled!(log::Level::Warn) {
                                warn!("Dropping {} queued txs from {}", removed, sender);
                            }
                        }
                    }
                    block
                }
                Err(e) => {
                    // nothing was committed, the drained txs are packed again next cycle
                    mempool.restore(drained);
                    if log::log_enabled!(log::Level::Error) {
                        error!("Block production failed: {}", e);
                    }
                    return Err(e);
                }
            };
            gauge!("chainsim_mempool_size").set(mempool.size() as f64);
            block
        };

        cycle.transition(AssemblerState::Appended);
        self.notifier
            .lock()
            .await
            .notify(&NewBlockEvent::from(&*block));

        counter!("chainsim_blocks_produced").increment(1);
        if log::log_enabled!(log::Level::Info) {
            info!(
                "Block {} appended at height {} with {} txs ({} gas)",
                block.get_hash(),
                block.get_number(),
                block.get_txs_count(),
                block.gas_used
            );
        }
        Ok(block)
    }

    // Apply the drained transactions on top of the chain and commit the block
    // Returns the block and the senders that had a transaction dropped
    async fn assemble_block(
        &self,
        storage: &mut S,
        drained: &[(Arc<Hash>, Arc<Transaction>)],
    ) -> Result<(Arc<Block>, HashSet<Address>), BlockchainError> {
        let top = storage.get_top_block().await?;
        let number = top.get_number() + 1;

        let mut changes = LedgerChanges::new();
        let mut included = Vec::with_capacity(drained.len());
        let mut broken_senders = HashSet::new();
        let mut gas_used = 0;
        for (hash, tx) in drained {
            match changes.apply_transfer(&*storage, tx).await {
                Ok(()) => {
                    trace!("tx {} applied in block {}", hash, number);
                    gas_used += tx.get_gas_limit();
                    included.push((Arc::clone(hash), Arc::clone(tx)));
                }
                Err(BlockchainError::Inclusion(e)) => {
                    counter!("chainsim_txs_dropped").increment(1);
                    if log::log_enabled!(log::Level::Warn) {
                        warn!("Dropping tx {} from block {}: {}", hash, number, e);
                    }
                    broken_senders.insert(*tx.get_source());
                }
                Err(e) => return Err(e),
            }
        }

        // timestamps never go backward
        let timestamp = self.clock.now_millis().max(top.timestamp);
        let hashes: Vec<Hash> = included.iter().map(|(hash, _)| Hash::clone(hash)).collect();
        let header = BlockHeader::new(
            number,
            top.get_hash().clone(),
            timestamp,
            self.config.block_gas_limit,
            gas_used,
            &hashes,
        );
        let block = storage
            .commit_block(Block::new(header, hashes), changes.into_accounts(), included)
            .await?;
        Ok((block, broken_senders))
    }

    pub async fn get_block_at(&self, number: BlockNumber) -> Result<Arc<Block>, BlockchainError> {
        let storage = self.storage.read().await;
        storage.get_block_at(number).await
    }

    pub async fn get_block_by_hash(&self, hash: &Hash) -> Result<Arc<Block>, BlockchainError> {
        let storage = self.storage.read().await;
        storage.get_block_by_hash(hash).await
    }

    pub async fn get_top_block(&self) -> Result<Arc<Block>, BlockchainError> {
        let storage = self.storage.read().await;
        storage.get_top_block().await
    }

    pub async fn get_top_block_number(&self) -> Result<BlockNumber, BlockchainError> {
        Ok(self.get_top_block().await?.get_number())
    }

    // Number of blocks, genesis included
    pub async fn count_blocks(&self) -> u64 {
        let storage = self.storage.read().await;
        storage.count_blocks().await
    }

    // Included transaction with the number of its block
    pub async fn get_transaction(
        &self,
        hash: &Hash,
    ) -> Result<(Arc<Transaction>, BlockNumber), BlockchainError> {
        let storage = self.storage.read().await;
        storage.get_executed_transaction(hash).await
    }

    // Balance as of the block selected by `tag`
    // Pending reads the latest appended state, queued transactions are not applied
    pub async fn get_balance(&self, address: &Address, tag: BlockTag) -> Result<u64, BlockchainError> {
        let storage = self.storage.read().await;
        let number = match tag {
            BlockTag::Number(number) => {
                let length = storage.count_blocks().await;
                if number >= length {
                    return Err(QueryError::IndexOutOfRange {
                        index: number,
                        length,
                    }
                    .into());
                }
                number
            }
            BlockTag::Earliest => GENESIS_BLOCK_NUMBER,
            BlockTag::Latest | BlockTag::Pending => storage.get_top_block().await?.get_number(),
        };
        storage.get_balance_at(address, number).await
    }

    pub async fn get_account(&self, address: &Address) -> Result<Account, BlockchainError> {
        let storage = self.storage.read().await;
        ledger::get_account(&*storage, address).await
    }

    // Count of included transactions sent by this address
    pub async fn get_nonce(&self, address: &Address) -> Result<Nonce, BlockchainError> {
        Ok(self.get_account(address).await?.nonce)
    }

    // Nonce the next submitted transaction must carry
    pub async fn get_next_nonce(&self, address: &Address) -> Result<Nonce, BlockchainError> {
        let storage = self.storage.read().await;
        let mempool = self.mempool.read().await;
        AdmissionFilter::get_expected_nonce(&*storage, &mempool, address).await
    }

    // Pending hashes in packing order
    pub async fn get_pending_transactions(&self) -> Vec<Hash> {
        let mempool = self.mempool.read().await;
        mempool.get_txs_hashes()
    }

    pub async fn get_mempool_size(&self) -> usize {
        let mempool = self.mempool.read().await;
        mempool.size()
    }

    pub async fn subscribe(&self) -> Subscription {
        self.notifier.lock().await.subscribe()
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.lock().await.unsubscribe(id)
    }
}
