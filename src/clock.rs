//! The game clock: a counter bumped by a periodic overflow source.
//!
//! On the board the source is a timer interrupt; on a desktop it is a thread.
//! Either way there is exactly one writer and the game loop is the only reader.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Seconds per overflow: a 256-count timer with a /1024 prescaler at 8 MHz.
pub const TICK_PERIOD: f64 = 256.0 * 1024.0 / 8_000_000.0;

#[derive(Debug, Default)]
pub struct TickCounter {
    count: AtomicU32,
    running: AtomicBool,
}

impl TickCounter {
    /// A stopped counter at zero.
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Called by the periodic source. Ignored while stopped.
    pub fn on_overflow(&self) {
        if self.running.load(Ordering::Acquire) {
            self.count.fetch_add(1, Ordering::AcqRel);
        }
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::Release);
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    pub fn elapsed_seconds(&self) -> f64 {
        f64::from(self.count()) * TICK_PERIOD
    }
}
