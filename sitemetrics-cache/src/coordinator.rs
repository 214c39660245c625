//! Stats cache coordinator.
//!
//! Composes the freshness gate, the remote fetcher, and the store into a
//! single "get stats" operation with exactly one meaningful path per call:
//! serve the cached value, or fetch, persist, and return the fresh one.

use std::sync::Arc;

use tracing::{debug, warn};

use sitemetrics_core::{
    Clock, FreshnessRecord, Granularity, LimitMode, ReferenceDate, SiteId, StatsCacheConfig,
    StatsRequestKey, StatsResult,
};

use crate::freshness::{FreshnessGate, StatsRead};
use crate::remote::RemoteStatsFetcher;
use crate::traits::{CachedMetric, StatsCacheStore};

/// Orchestrates cached stats reads and remote refreshes.
///
/// The store behind `S` is keyed with last-write-wins semantics; the
/// read-decide-write sequence is not atomic across concurrent calls for
/// the same key, so two concurrent forced refreshes may race and the last
/// write wins. Analytics data is eventually consistent, so that relaxation
/// is accepted rather than locked away.
pub struct StatsCacheCoordinator<S: StatsCacheStore> {
    store: Arc<S>,
    gate: FreshnessGate,
    clock: Arc<dyn Clock>,
    config: StatsCacheConfig,
}

impl<S: StatsCacheStore> StatsCacheCoordinator<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: StatsCacheConfig) -> Self {
        let gate = FreshnessGate::new(config.freshness_window, Arc::clone(&clock));
        Self {
            store,
            gate,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &StatsCacheConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Answer a stats request, fetching from the network only when the
    /// cached value cannot be served.
    ///
    /// The freshness check always completes before any network call; a
    /// fresh slot is served without touching the fetcher. On a miss (or
    /// `forced = true`) the fetcher is called with `limit.fetch_count()`
    /// items, and the model plus its freshness record are written only
    /// after the fetch has fully succeeded. A failed fetch leaves the
    /// store exactly as it was, so callers can still fall back to
    /// [`get_cached`](Self::get_cached).
    pub async fn fetch<T, F>(
        &self,
        site: SiteId,
        granularity: Granularity,
        date: ReferenceDate,
        limit: LimitMode,
        forced: bool,
        fetcher: &F,
    ) -> StatsResult<StatsRead<T>>
    where
        T: CachedMetric,
        F: RemoteStatsFetcher<T>,
    {
        let key = StatsRequestKey::new(site, T::metric_type(), granularity, date);
        let record = self.store.read_freshness(&key).await?;

        if let Some(record) = record {
            if self.gate.is_fresh(Some(&record), limit.count(), forced) {
                // A fresh record whose model slot is empty is an
                // inconsistent cache state; treat it as a miss rather than
                // an error.
                match self.store.read_model::<T>(&key).await? {
                    Some(model) => {
                        debug!(
                            site = %site,
                            metric = %T::metric_type(),
                            limit = limit.count(),
                            "serving stats from cache"
                        );
                        return Ok(StatsRead::from_cache(
                            model.truncated(limit.count()),
                            record.fetched_at,
                        ));
                    }
                    None => {
                        warn!(
                            site = %site,
                            metric = %T::metric_type(),
                            "freshness record without cached model, refetching"
                        );
                    }
                }
            }
        }

        debug!(
            site = %site,
            metric = %T::metric_type(),
            count = limit.fetch_count(),
            forced,
            "fetching stats from network"
        );
        let raw = fetcher
            .fetch(site, granularity, date, limit.fetch_count(), forced)
            .await?;

        let model = T::from_raw(raw);
        let fetched_at = self.clock.now();
        self.store.write_model(&key, &model).await?;
        self.store
            .write_freshness(&key, &FreshnessRecord::new(fetched_at, limit.fetch_count()))
            .await?;

        Ok(StatsRead::from_network(
            model.truncated(limit.count()),
            fetched_at,
        ))
    }

    /// Read whatever the store holds for this slot, without any network
    /// call or freshness consideration. Used for synchronous/offline reads
    /// and as the fallback after a failed [`fetch`](Self::fetch).
    pub async fn get_cached<T: CachedMetric>(
        &self,
        site: SiteId,
        granularity: Granularity,
        date: ReferenceDate,
        limit: LimitMode,
    ) -> StatsResult<Option<T>> {
        let key = StatsRequestKey::new(site, T::metric_type(), granularity, date);
        let model = self.store.read_model::<T>(&key).await?;
        Ok(model.map(|m| m.truncated(limit.count())))
    }
}

impl<S: StatsCacheStore> Clone for StatsCacheCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gate: self.gate.clone(),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStatsStore;
    use crate::remote::{RawReferrerGroup, RawReferrersResponse};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use sitemetrics_core::{MetricType, ReferrerTree, StatsError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    // Always succeeds with `group_count` empty groups, counting calls.
    struct CountingFetcher {
        group_count: usize,
        calls: AtomicUsize,
        last_count: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(group_count: usize) -> Self {
            Self {
                group_count,
                calls: AtomicUsize::new(0),
                last_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteStatsFetcher<ReferrerTree> for CountingFetcher {
        async fn fetch(
            &self,
            _site: SiteId,
            _granularity: Granularity,
            _date: ReferenceDate,
            count: usize,
            _forced: bool,
        ) -> StatsResult<RawReferrersResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_count.store(count, Ordering::SeqCst);
            Ok(RawReferrersResponse {
                groups: (0..self.group_count)
                    .map(|i| RawReferrerGroup {
                        name: format!("group-{}.com", i),
                        total: 10,
                        referrers: vec![],
                    })
                    .collect(),
            })
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl RemoteStatsFetcher<ReferrerTree> for FailingFetcher {
        async fn fetch(
            &self,
            _site: SiteId,
            _granularity: Granularity,
            _date: ReferenceDate,
            _count: usize,
            _forced: bool,
        ) -> StatsResult<RawReferrersResponse> {
            Err(StatsError::network("connection refused"))
        }
    }

    fn coordinator() -> (StatsCacheCoordinator<MemoryStatsStore>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock(Mutex::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        )));
        let coordinator = StatsCacheCoordinator::new(
            Arc::new(MemoryStatsStore::new()),
            clock.clone(),
            StatsCacheConfig::default(),
        );
        (coordinator, clock)
    }

    fn date() -> ReferenceDate {
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_fresh_slot_is_served_without_network() {
        let (coordinator, _clock) = coordinator();
        let site = SiteId::generate();
        let fetcher = CountingFetcher::new(9);

        coordinator
            .fetch::<ReferrerTree, _>(site, Granularity::Days, date(), LimitMode::Top(8), true, &fetcher)
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let read = coordinator
            .fetch::<ReferrerTree, _>(site, Granularity::Days, date(), LimitMode::Top(8), false, &fetcher)
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(read.served_from_cache());
        assert_eq!(read.value().groups.len(), 8);
    }

    #[tokio::test]
    async fn test_wider_limit_refetches_with_overfetch_count() {
        let (coordinator, _clock) = coordinator();
        let site = SiteId::generate();
        let fetcher = CountingFetcher::new(21);

        coordinator
            .fetch::<ReferrerTree, _>(site, Granularity::Days, date(), LimitMode::Top(8), false, &fetcher)
            .await
            .unwrap();
        assert_eq!(fetcher.last_count.load(Ordering::SeqCst), 9);

        coordinator
            .fetch::<ReferrerTree, _>(site, Granularity::Days, date(), LimitMode::Top(20), false, &fetcher)
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.last_count.load(Ordering::SeqCst), 21);
    }

    #[tokio::test]
    async fn test_dangling_freshness_record_triggers_refetch() {
        let (coordinator, clock) = coordinator();
        let site = SiteId::generate();
        let fetcher = CountingFetcher::new(3);

        // Ledger entry without a model in the slot.
        let key = StatsRequestKey::new(site, MetricType::Referrers, Granularity::Days, date());
        coordinator
            .store()
            .write_freshness(&key, &FreshnessRecord::new(clock.now(), 9))
            .await
            .unwrap();

        let read = coordinator
            .fetch::<ReferrerTree, _>(site, Granularity::Days, date(), LimitMode::Top(8), false, &fetcher)
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(!read.served_from_cache());
    }

    #[tokio::test]
    async fn test_failed_fetch_surfaces_error() {
        let (coordinator, _clock) = coordinator();
        let site = SiteId::generate();

        let err = coordinator
            .fetch::<ReferrerTree, _>(site, Granularity::Days, date(), LimitMode::Top(8), false, &FailingFetcher)
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::Network { .. }));
    }
}
