//! Cache orchestration for the sitemetrics stats subsystem.
//!
//! This crate decides whether a previously fetched analytics result is
//! still usable, orchestrates a remote fetch when it is not, and persists
//! the result, without ever destroying a good cached value on a failed
//! refresh.
//!
//! # Design Philosophy
//!
//! Freshness is explicit state, not timestamps scattered across callers:
//! every successful fetch writes a [`sitemetrics_core::FreshnessRecord`]
//! to the store's ledger, and the pure [`FreshnessGate`] is the only place
//! that interprets it. Reads return a [`StatsRead<T>`] so callers always
//! know whether they are looking at cached or just-fetched data.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(MemoryStatsStore::new());
//! let clock = Arc::new(SystemClock);
//! let coordinator = StatsCacheCoordinator::new(store, clock, StatsCacheConfig::default());
//!
//! let read = coordinator
//!     .fetch::<ReferrerTree, _>(site, Granularity::Days, date, LimitMode::Top(8), false, &fetcher)
//!     .await?;
//! if read.served_from_cache() {
//!     // no network call was made
//! }
//! ```

pub mod coordinator;
pub mod freshness;
pub mod memory_store;
pub mod moderation;
pub mod remote;
pub mod traits;

pub use coordinator::StatsCacheCoordinator;
pub use freshness::{FreshnessGate, StatsRead};
pub use memory_store::MemoryStatsStore;
pub use moderation::{ModerationReceipt, SpamModerationService, SpamReporter};
pub use remote::{
    RawReferrer, RawReferrerGroup, RawReferrersResponse, RawSearchTerm, RawSearchTermsResponse,
    RemoteStatsFetcher,
};
pub use traits::{CachedMetric, StatsCacheStore};
