//! Sitemetrics Core - Stats Domain Types
//!
//! Pure data structures and pure algorithms for the stats retrieval and
//! caching subsystem. This crate contains no I/O: the cache orchestration,
//! network boundary traits, and store backends live in `sitemetrics-cache`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod clock;
pub mod config;
pub mod enums;
pub mod error;
pub mod referrers;
pub mod search_terms;

pub use clock::{Clock, SystemClock};
pub use config::StatsCacheConfig;
pub use enums::{Granularity, GranularityParseError, MetricType};
pub use error::{StatsError, StatsResult, StoreError};
pub use referrers::{Referrer, ReferrerGroup, ReferrerTree};
pub use search_terms::{SearchTerm, SearchTermList};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Calendar date anchoring a stats period (no time-of-day component).
pub type ReferenceDate = chrono::NaiveDate;

/// Opaque site identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub Uuid);

impl SiteId {
    /// Generate a new UUIDv7 site id (timestamp-sortable).
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CACHE SLOT IDENTITY
// ============================================================================

/// Identifies exactly one cache slot.
///
/// For a fixed key there is at most one cached model and one freshness
/// record at any time; writes are last-write-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatsRequestKey {
    pub site: SiteId,
    pub metric: MetricType,
    pub granularity: Granularity,
    pub date: ReferenceDate,
}

impl StatsRequestKey {
    pub fn new(
        site: SiteId,
        metric: MetricType,
        granularity: Granularity,
        date: ReferenceDate,
    ) -> Self {
        Self {
            site,
            metric,
            granularity,
            date,
        }
    }
}

// ============================================================================
// FRESHNESS LEDGER
// ============================================================================

/// Ledger entry recording the last successful fetch for a cache slot.
///
/// Created or overwritten on every successful remote fetch; never
/// garbage-collected independently of the slot it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessRecord {
    /// Wall-clock time of the fetch that produced the cached model.
    pub fetched_at: Timestamp,
    /// Item count the fetch was issued with (including the overfetch slot).
    pub item_limit_used: usize,
}

impl FreshnessRecord {
    pub fn new(fetched_at: Timestamp, item_limit_used: usize) -> Self {
        Self {
            fetched_at,
            item_limit_used,
        }
    }

    /// Age of this record relative to `now`. Clock skew (a record from the
    /// future) counts as zero age.
    pub fn age(&self, now: Timestamp) -> std::time::Duration {
        now.signed_duration_since(self.fetched_at)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

// ============================================================================
// LIMIT CONTRACT
// ============================================================================

/// Pagination contract for a stats request.
///
/// `Top(n)` asks for the top `n` items by the server's ranking. The network
/// fetch requests `n + 1` items so "more items exist" can be detected
/// without a separate count endpoint; models are truncated back to `n`
/// before being handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitMode {
    /// Top `n` items. A zero `n` is treated as 1: an empty page is never a
    /// meaningful request, and a zero fetch count would break the
    /// overfetch contract.
    Top(usize),
}

impl LimitMode {
    /// Number of items the caller will see. At least 1.
    pub fn count(&self) -> usize {
        match self {
            LimitMode::Top(n) => (*n).max(1),
        }
    }

    /// Number of items requested from the network (one overfetch slot).
    pub fn fetch_count(&self) -> usize {
        self.count() + 1
    }
}
