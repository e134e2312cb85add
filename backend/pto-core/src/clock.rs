// src/clock.rs
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of "now" in local time. Injected so balances can be computed as of any date.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock for tests and for `--as-of` evaluation.
#[derive(Debug, Clone)]
pub struct FixedClock {
    current_time: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(now)),
        }
    }

    /// Noon on the given date.
    pub fn on(date: NaiveDate) -> Self {
        Self::new(date.and_hms_opt(12, 0, 0).unwrap_or_default())
    }

    /// A plain timestamp cannot be left half-written, so a poisoned lock is recovered.
    fn current(&self) -> MutexGuard<'_, NaiveDateTime> {
        self.current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_time(&self, now: NaiveDateTime) {
        *self.current() = now;
    }

    pub fn advance(&self, duration: Duration) {
        *self.current() += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.current()
    }
}
