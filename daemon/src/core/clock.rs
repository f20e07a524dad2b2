use chainsim_common::time::{get_current_time_in_millis, TimestampMillis};
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock abstraction used to stamp produced blocks
///
/// The engine never reads the wall clock directly. Production code injects
/// [`SystemClock`] while tests inject a [`ManualClock`] so block timestamps
/// are fully reproducible.
///
/// # Examples
///
/// ```rust
/// use chainsim_daemon::core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(500);
/// assert_eq!(clock.now_millis(), 1_500);
/// ```
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the UNIX epoch
    fn now_millis(&self) -> TimestampMillis;
}

/// System real-time clock (production environment)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> TimestampMillis {
        get_current_time_in_millis()
    }
}

/// Manually driven clock (test environment)
///
/// Time only moves when [`ManualClock::set`] or [`ManualClock::advance`]
/// is called.
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: TimestampMillis) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: TimestampMillis) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `millis`, saturating at `u64::MAX`
    pub fn advance(&self, millis: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(millis))
            });
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> TimestampMillis {
        self.now.load(Ordering::SeqCst)
    }
}
