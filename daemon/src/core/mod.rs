pub mod admission;
pub mod assembler;
pub mod blockchain;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod mempool;
pub mod notifier;
pub mod simulator;
pub mod storage;
pub mod tx_selector;
