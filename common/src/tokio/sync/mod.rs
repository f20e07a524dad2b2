//! Tokio synchronization primitives used by the engine

pub use tokio::sync::{
    mpsc, oneshot, watch, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
