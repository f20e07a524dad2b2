use chainsim_common::config::COIN_VALUE;

// Millis per second, it is used to prevent having random 1000 values anywhere
pub const MILLIS_PER_SECOND: u64 = 1000;

// Block rules
// Gas budget of a single block
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 6_000_000;
// One block produced per tick
pub const DEFAULT_BLOCK_TIME_MS: u64 = MILLIS_PER_SECOND;
// Lowest tick interval accepted, below this the loop only burns CPU
pub const MIN_BLOCK_TIME_MS: u64 = 10;

// Genesis rules
// Number of unlocked accounts created at genesis
pub const DEFAULT_ACCOUNTS_COUNT: u32 = 10;
// Balance given to each unlocked account at genesis
pub const DEFAULT_INITIAL_BALANCE: u64 = 1000 * COIN_VALUE;
// Seed used to derive the unlocked accounts addresses
pub const DEFAULT_ACCOUNTS_SEED: &str = "chainsim";
