use chainsim_common::tokio::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU8, Ordering};
use strum::{AsRefStr, Display};

// Stage of the block production cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum AssemblerState {
    Idle = 0,
    // Draining the pending pool
    Assembling = 1,
    // Applying drained transactions to the ledger
    Applying = 2,
    // Block appended, subscribers being notified
    Appended = 3,
}

impl AssemblerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Assembling,
            2 => Self::Applying,
            3 => Self::Appended,
            _ => Self::Idle,
        }
    }
}

// Tracks the current cycle and keeps cycles from overlapping
pub struct BlockAssembler {
    state: AtomicU8,
    cycle: Mutex<()>,
}

impl Default for BlockAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockAssembler {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(AssemblerState::Idle as u8),
            cycle: Mutex::new(()),
        }
    }

    pub fn get_state(&self) -> AssemblerState {
        AssemblerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    // Wait for the previous cycle to end and start a new one
    // The state goes back to Idle when the returned guard is dropped
    pub async fn begin(&self) -> CycleGuard<'_> {
        let lock = self.cycle.lock().await;
        self.set_state(AssemblerState::Assembling);
        CycleGuard {
            assembler: self,
            _lock: lock,
        }
    }

    fn set_state(&self, state: AssemblerState) {
        log::trace!("assembler state: {}", state);
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

// Exclusive handle on a running cycle
pub struct CycleGuard<'a> {
    assembler: &'a BlockAssembler,
    _lock: MutexGuard<'a, ()>,
}

impl CycleGuard<'_> {
    pub fn transition(&self, state: AssemblerState) {
        self.assembler.set_state(state);
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.assembler.set_state(AssemblerState::Idle);
    }
}
