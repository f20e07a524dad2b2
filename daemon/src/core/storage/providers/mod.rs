mod account;
mod block;
mod transaction;

pub use self::{account::AccountProvider, block::BlockProvider, transaction::TransactionProvider};
