// Shared helpers of the integration tests
#![allow(dead_code)]

use chainsim_common::{
    block::Block,
    crypto::{Address, Hash},
    transaction::Transaction,
};
use chainsim_daemon::core::{
    blockchain::Blockchain, clock::ManualClock, config::Config, error::BlockchainError,
    simulator::Simulator, storage::MemoryStorage,
};
use std::sync::Arc;

pub const BLOCK_GAS_LIMIT: u64 = 6_000_000;
pub const BLOCK_TIME_MS: u64 = 1_000;
pub const GENESIS_TIME_MS: u64 = 1_700_000_000_000;
pub const INITIAL_BALANCE: u64 = 1_000_000;

pub struct TestChain {
    pub blockchain: Arc<Blockchain<MemoryStorage>>,
    pub clock: Arc<ManualClock>,
}

impl TestChain {
    pub fn account(&self, index: usize) -> Address {
        self.blockchain.get_accounts()[index]
    }

    pub async fn send(
        &self,
        from: usize,
        to: Address,
        nonce: u64,
        value: u64,
        gas_limit: u64,
    ) -> Result<Hash, BlockchainError> {
        let tx = Transaction::new(self.account(from), to, nonce, value, gas_limit);
        self.blockchain.add_tx_to_mempool(tx).await
    }

    // One tick of the block timer
    pub async fn tick(&self) -> Arc<Block> {
        self.clock.advance(BLOCK_TIME_MS);
        self.blockchain.produce_block().await.unwrap()
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_config() -> Config {
    Config {
        block_gas_limit: BLOCK_GAS_LIMIT,
        block_time_ms: BLOCK_TIME_MS,
        simulator: Simulator::Manual,
        accounts: 3,
        initial_balance: INITIAL_BALANCE,
        ..Default::default()
    }
}

pub async fn create_test_chain() -> TestChain {
    create_test_chain_with(test_config()).await
}

pub async fn create_test_chain_with(config: Config) -> TestChain {
    init_logger();
    let clock = Arc::new(ManualClock::new(GENESIS_TIME_MS));
    let blockchain = Blockchain::new(config, MemoryStorage::new(), clock.clone())
        .await
        .unwrap();
    TestChain { blockchain, clock }
}
