//! Injectable time source.
//!
//! All "now" reads in the freshness gate and coordinator go through this
//! trait so cache expiry can be simulated deterministically in tests
//! instead of sleeping against the wall clock.

use chrono::{DateTime, Utc};

/// Time source abstraction.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock reading the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
