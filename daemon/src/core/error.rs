use chainsim_common::{
    account::Nonce,
    block::BlockNumber,
    crypto::{Address, Hash},
};
use thiserror::Error;

// Rejections returned to the submitter, the transaction never enters the pool
// Messages are matched verbatim by existing clients, do not reword them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("sender account not recognized")]
    InvalidSender(Address),
    #[error("intrinsic gas too low")]
    IntrinsicGasTooLow { gas_limit: u64, required: u64 },
    #[error("Exceeds block gas limit")]
    ExceedsBlockGasLimit { gas_limit: u64, block_gas_limit: u64 },
    #[error("the tx doesn't have the correct nonce. account has nonce of: {expected} tx has nonce of: {got}")]
    NonceMismatch { expected: Nonce, got: Nonce },
    #[error("sender doesn't have enough funds to send tx. The upfront cost is: {cost} and the sender's account only has: {balance}")]
    InsufficientFunds { cost: u64, balance: u64 },
}

// Failures while applying an admitted transaction to the ledger
// The transaction is dropped from its block and never retried
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InclusionError {
    #[error("Insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: u64, have: u64 },
    #[error("Invalid nonce at inclusion: account has nonce of {expected}, tx has nonce of {got}")]
    NonceMismatch { expected: Nonce, got: Nonce },
    #[error("Balance overflow for {}", _0)]
    BalanceOverflow(Address),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("'blocks' index out of range: index {index}; length: {length}")]
    IndexOutOfRange { index: u64, length: u64 },
    #[error("Block {} not found", _0)]
    BlockNotFound(Hash),
    #[error("Transaction {} not found", _0)]
    TransactionNotFound(Hash),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Inclusion(#[from] InclusionError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("Invalid block number: expected {expected}, got {got}")]
    InvalidBlockNumber { expected: BlockNumber, got: BlockNumber },
    #[error("Invalid parent hash for block {}", _0)]
    InvalidParentHash(BlockNumber),
    #[error("Chain has no genesis block")]
    NoGenesisBlock,
    #[error("Genesis block already exists")]
    GenesisAlreadyExists,
    #[error("Invalid configuration: {}", _0)]
    InvalidConfig(&'static str),
}
