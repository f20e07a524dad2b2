// Allow some clippy lints shared with the daemon crate
#![allow(clippy::module_inception)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_return)]

pub mod account;
pub mod api;
pub mod block;
pub mod crypto;
pub mod serializer;
pub mod transaction;

pub mod config;
pub mod logger;
pub mod rpc;
pub mod time;

pub mod tokio;
