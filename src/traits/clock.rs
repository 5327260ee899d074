//! Time source for inode timestamps.

use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

/// Source of "now" for inode timestamps.
///
/// The owning filesystem shares one clock among all of its inodes, usually
/// as `Arc<dyn Clock>`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; inodes call `now` while holding
/// their exclusive lock from any thread.
///
/// # Example
///
/// ```rust
/// use memfs_inode::{Clock, SystemClock};
///
/// fn stamp<C: Clock + ?Sized>(clock: &C) -> std::time::SystemTime {
///     clock.now()
/// }
///
/// let _ = stamp(&SystemClock);
/// ```
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> SystemTime;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// Used for deterministic timestamps in tests and simulations.
#[derive(Debug)]
pub struct SimulatedClock {
    now: Mutex<SystemTime>,
}

impl SimulatedClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute time.
    pub fn set_time(&self, t: SystemTime) {
        *self.now.lock() = t;
    }

    /// Move forward by `d`.
    pub fn advance_time(&self, d: Duration) {
        let mut now = self.now.lock();
        *now += d;
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}
