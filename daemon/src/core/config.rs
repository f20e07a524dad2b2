use super::{error::BlockchainError, simulator::Simulator};
use crate::config::{
    DEFAULT_ACCOUNTS_COUNT, DEFAULT_ACCOUNTS_SEED, DEFAULT_BLOCK_GAS_LIMIT, DEFAULT_BLOCK_TIME_MS,
    DEFAULT_INITIAL_BALANCE, MIN_BLOCK_TIME_MS,
};
use chainsim_common::{config::INTRINSIC_GAS, crypto::Address};
use serde::{Deserialize, Serialize};

const fn default_block_gas_limit() -> u64 {
    DEFAULT_BLOCK_GAS_LIMIT
}

const fn default_block_time_ms() -> u64 {
    DEFAULT_BLOCK_TIME_MS
}

const fn default_accounts() -> u32 {
    DEFAULT_ACCOUNTS_COUNT
}

const fn default_initial_balance() -> u64 {
    DEFAULT_INITIAL_BALANCE
}

fn default_accounts_seed() -> String {
    DEFAULT_ACCOUNTS_SEED.to_owned()
}

fn default_simulator() -> Simulator {
    Simulator::Interval
}

/// Block production settings of the daemon.
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct Config {
    /// Gas budget of a single block.
    ///
    /// The summed gas limits of the transactions packed in a block never
    /// exceed this value.
    #[clap(long, default_value_t = default_block_gas_limit())]
    #[serde(default = "default_block_gas_limit")]
    pub block_gas_limit: u64,

    /// Interval between two produced blocks, in milliseconds.
    #[clap(long, default_value_t = default_block_time_ms())]
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,

    /// Block production mode: `interval` or `manual`.
    #[clap(long, default_value_t = default_simulator())]
    #[serde(default = "default_simulator")]
    pub simulator: Simulator,

    /// Number of unlocked accounts funded at genesis.
    #[clap(long, default_value_t = default_accounts())]
    #[serde(default = "default_accounts")]
    pub accounts: u32,

    /// Balance given to every unlocked account at genesis, in atomic units.
    #[clap(long, default_value_t = default_initial_balance())]
    #[serde(default = "default_initial_balance")]
    pub initial_balance: u64,

    /// Seed the unlocked account addresses are derived from.
    #[clap(long, default_value_t = default_accounts_seed())]
    #[serde(default = "default_accounts_seed")]
    pub accounts_seed: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            block_time_ms: DEFAULT_BLOCK_TIME_MS,
            simulator: default_simulator(),
            accounts: DEFAULT_ACCOUNTS_COUNT,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            accounts_seed: default_accounts_seed(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), BlockchainError> {
        if self.block_gas_limit < INTRINSIC_GAS {
            return Err(BlockchainError::InvalidConfig(
                "block gas limit is below the intrinsic gas of a transfer",
            ));
        }

        if self.simulator == Simulator::Interval && self.block_time_ms < MIN_BLOCK_TIME_MS {
            return Err(BlockchainError::InvalidConfig("block time is too low"));
        }

        if self.accounts == 0 {
            return Err(BlockchainError::InvalidConfig(
                "at least one unlocked account is required",
            ));
        }

        Ok(())
    }

    // Addresses the node can send from, in derivation order
    pub fn unlocked_accounts(&self) -> Vec<Address> {
        (0..self.accounts)
            .map(|index| Address::derive(&self.accounts_seed, index))
            .collect()
    }
}
