pub const VERSION: &str = env!("BUILD_VERSION");

// 8 decimals numbers
pub const COIN_DECIMALS: u8 = 8;
// 100 000 000 to represent 1 coin
pub const COIN_VALUE: u64 = 10u64.pow(COIN_DECIMALS as u32);

// Gas charged for a plain value transfer
// Any transaction declaring less than this is rejected at admission
pub const INTRINSIC_GAS: u64 = 21_000;

// Gas limit used when a transaction request does not declare one
pub const DEFAULT_TX_GAS_LIMIT: u64 = INTRINSIC_GAS;

// Address length in bytes (160 bits)
pub const ADDRESS_SIZE: usize = 20;

// Prefix used when rendering hashes and addresses as hex
pub const HEX_PREFIX: &str = "0x";
