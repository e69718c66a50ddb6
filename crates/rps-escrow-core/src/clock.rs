//! Time source for round timeouts, in unix seconds.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

pub trait Clock: Send + Sync {
    /// Current time in seconds since the unix epoch
    fn now(&self) -> u64;
}

/// Wall clock with an adjustable forward skew (for timeout testing)
#[derive(Debug, Default)]
pub struct SystemClock {
    skew_secs: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance simulated time by seconds
    pub fn advance(&self, seconds: u64) {
        self.skew_secs.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        let wall = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        wall.saturating_add(self.skew_secs.load(Ordering::SeqCst))
    }
}

/// Fully controlled clock for tests
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
