//! Monotonic clocks for scheduling.
//!
//! The envelope scheduler reads "now" from a [`Clock`] and writes automation
//! points relative to it. Two implementations are provided:
//!
//! - [`SystemClock`] - wall-clock seconds since construction
//! - [`ManualClock`] - offline clock advanced explicitly (tests, CLI)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonically non-decreasing time source in seconds.
pub trait Clock: Send + Sync {
    /// Current time in seconds.
    fn now(&self) -> f64;
}

/// Clock driven by [`Instant`], starting at zero when created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock reading 0.0 now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Offline clock that only moves when told to.
///
/// Stored as `f64` bits in an atomic so it can be shared through
/// `Arc<dyn Clock>` while the owner keeps advancing it. Requests to move
/// backwards are ignored.
///
/// ```rust
/// use thump_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(0.0);
/// clock.advance(0.5);
/// clock.set(0.25); // ignored, would go backwards
/// assert_eq!(clock.now(), 0.5);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    /// Creates a clock at `start` seconds (negative or non-finite starts at 0).
    pub fn new(start: f64) -> Self {
        let start = if start.is_finite() { start.max(0.0) } else { 0.0 };
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    /// Moves the clock to `time`, if that is not earlier than the current reading.
    pub fn set(&self, time: f64) {
        if !time.is_finite() {
            return;
        }
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                (time > f64::from_bits(bits)).then_some(time.to_bits())
            });
    }

    /// Moves the clock forward by `seconds` (negative steps are ignored).
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            self.set(self.now() + seconds);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}
