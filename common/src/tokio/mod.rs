//! Tokio re-exports shared by every crate of the workspace
//!
//! Crates depend on these paths instead of tokio directly so the runtime
//! primitives stay consistent across the workspace.

pub mod sync;

pub use tokio::{select, spawn, task::JoinHandle, time};
