// Chainsim Daemon Library
// Exposes the engine for the binary, the integration tests and embedders

#![allow(clippy::type_complexity)]
#![allow(clippy::uninlined_format_args)]

extern crate log;

pub mod config;
pub mod core;
pub mod rpc;
