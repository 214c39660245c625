//! Freshness gating for cache reads.
//!
//! The gate is the only place that interprets the freshness ledger. It is a
//! pure function over the record, the requested limit, the forced flag, and
//! an injected clock, which keeps cache-expiry behavior deterministic under
//! test.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use sitemetrics_core::{Clock, FreshnessRecord};

/// Decides whether a cached value may be served as-is.
#[derive(Clone)]
pub struct FreshnessGate {
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl FreshnessGate {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { window, clock }
    }

    /// The configured freshness window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// True iff the cached value behind `record` may be served for a
    /// request of `requested_limit` items.
    ///
    /// False when the caller forces a refresh, when no fetch has been
    /// recorded, when the recorded fetch covered fewer items than are now
    /// requested (a cached top-5 cannot answer a top-8), or when the record
    /// has aged past the window. No side effects.
    pub fn is_fresh(
        &self,
        record: Option<&FreshnessRecord>,
        requested_limit: usize,
        forced: bool,
    ) -> bool {
        if forced {
            return false;
        }
        let Some(record) = record else {
            return false;
        };
        if record.item_limit_used < requested_limit {
            return false;
        }
        record.age(self.clock.now()) < self.window
    }
}

impl std::fmt::Debug for FreshnessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessGate")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

/// Result of a coordinator read, carrying provenance metadata.
///
/// Callers always know whether the value was served from the cache or was
/// just fetched from the network.
#[derive(Debug, Clone)]
pub struct StatsRead<T> {
    value: T,
    fetched_at: DateTime<Utc>,
    served_from_cache: bool,
}

impl<T> StatsRead<T> {
    /// Wrap a value served from the cache without a network call.
    pub fn from_cache(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            fetched_at,
            served_from_cache: true,
        }
    }

    /// Wrap a value that was just fetched from the network.
    pub fn from_network(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            fetched_at,
            served_from_cache: false,
        }
    }

    /// Consume the wrapper and return the underlying model.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Wall-clock time of the fetch that produced this value.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// True when no network call was made for this read.
    pub fn served_from_cache(&self) -> bool {
        self.served_from_cache
    }

    /// Map the inner model to a new type.
    pub fn map<U, F>(self, f: F) -> StatsRead<U>
    where
        F: FnOnce(T) -> U,
    {
        StatsRead {
            value: f(self.value),
            fetched_at: self.fetched_at,
            served_from_cache: self.served_from_cache,
        }
    }
}

impl<T> AsRef<T> for StatsRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
