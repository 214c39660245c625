//! In-memory store backend.
//!
//! Backs tests and embedders that do not bring their own persistence.
//! Models are kept as JSON values so one map serves every metric type;
//! writes are last-write-wins per slot, matching the store contract.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use sitemetrics_core::{FreshnessRecord, StatsRequestKey, StatsResult, StoreError};

use crate::traits::{CachedMetric, StatsCacheStore};

/// Keyed in-memory store for cached models and freshness records.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    models: RwLock<HashMap<StatsRequestKey, serde_json::Value>>,
    freshness: RwLock<HashMap<StatsRequestKey, FreshnessRecord>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached models currently held.
    pub async fn model_count(&self) -> usize {
        self.models.read().await.len()
    }

    /// Drop every cached model and freshness record.
    pub async fn clear(&self) {
        self.models.write().await.clear();
        self.freshness.write().await.clear();
    }
}

fn codec_error(err: serde_json::Error) -> StoreError {
    StoreError::Codec {
        reason: err.to_string(),
    }
}

#[async_trait]
impl StatsCacheStore for MemoryStatsStore {
    async fn read_model<T: CachedMetric>(
        &self,
        key: &StatsRequestKey,
    ) -> StatsResult<Option<T>> {
        let models = self.models.read().await;
        match models.get(key) {
            Some(value) => {
                let model = serde_json::from_value(value.clone()).map_err(codec_error)?;
                Ok(Some(model))
            }
            None => Ok(None),
        }
    }

    async fn write_model<T: CachedMetric>(
        &self,
        key: &StatsRequestKey,
        model: &T,
    ) -> StatsResult<()> {
        let value = serde_json::to_value(model).map_err(codec_error)?;
        self.models.write().await.insert(*key, value);
        Ok(())
    }

    async fn read_freshness(&self, key: &StatsRequestKey) -> StatsResult<Option<FreshnessRecord>> {
        Ok(self.freshness.read().await.get(key).copied())
    }

    async fn write_freshness(
        &self,
        key: &StatsRequestKey,
        record: &FreshnessRecord,
    ) -> StatsResult<()> {
        self.freshness.write().await.insert(*key, *record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sitemetrics_core::{
        Granularity, MetricType, Referrer, ReferrerGroup, ReferrerTree, SearchTerm,
        SearchTermList, SiteId,
    };

    fn key(metric: MetricType) -> StatsRequestKey {
        StatsRequestKey::new(
            SiteId::generate(),
            metric,
            Granularity::Days,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    fn small_tree() -> ReferrerTree {
        ReferrerTree::new(vec![ReferrerGroup::new(
            "url_group_1.com",
            10,
            vec![Referrer::new("john.com", "https://john.com", 10)],
        )])
    }

    #[tokio::test]
    async fn test_empty_slot_reads_none() {
        let store = MemoryStatsStore::new();
        let k = key(MetricType::Referrers);
        assert_eq!(store.read_model::<ReferrerTree>(&k).await.unwrap(), None);
        assert_eq!(store.read_freshness(&k).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_model_round_trip() {
        let store = MemoryStatsStore::new();
        let k = key(MetricType::Referrers);
        let tree = small_tree();

        store.write_model(&k, &tree).await.unwrap();
        let read = store.read_model::<ReferrerTree>(&k).await.unwrap();
        assert_eq!(read, Some(tree));
        assert_eq!(store.model_count().await, 1);
    }

    #[tokio::test]
    async fn test_last_write_wins_per_slot() {
        let store = MemoryStatsStore::new();
        let k = key(MetricType::SearchTerms);

        let first = SearchTermList::new(vec![SearchTerm::new("old", 1)]);
        let second = SearchTermList::new(vec![SearchTerm::new("new", 2)]);
        store.write_model(&k, &first).await.unwrap();
        store.write_model(&k, &second).await.unwrap();

        let read = store.read_model::<SearchTermList>(&k).await.unwrap();
        assert_eq!(read, Some(second));
        assert_eq!(store.model_count().await, 1);
    }

    #[tokio::test]
    async fn test_slots_do_not_collide_across_metrics() {
        let store = MemoryStatsStore::new();
        let site = SiteId::generate();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let referrers_key =
            StatsRequestKey::new(site, MetricType::Referrers, Granularity::Days, date);
        let terms_key =
            StatsRequestKey::new(site, MetricType::SearchTerms, Granularity::Days, date);

        store.write_model(&referrers_key, &small_tree()).await.unwrap();
        assert_eq!(
            store.read_model::<SearchTermList>(&terms_key).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_freshness_round_trip_and_overwrite() {
        let store = MemoryStatsStore::new();
        let k = key(MetricType::Referrers);

        let first = FreshnessRecord::new(Utc::now(), 9);
        store.write_freshness(&k, &first).await.unwrap();
        assert_eq!(store.read_freshness(&k).await.unwrap(), Some(first));

        let second = FreshnessRecord::new(Utc::now(), 21);
        store.write_freshness(&k, &second).await.unwrap();
        assert_eq!(store.read_freshness(&k).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_clear_empties_both_maps() {
        let store = MemoryStatsStore::new();
        let k = key(MetricType::Referrers);
        store.write_model(&k, &small_tree()).await.unwrap();
        store
            .write_freshness(&k, &FreshnessRecord::new(Utc::now(), 9))
            .await
            .unwrap();

        store.clear().await;
        assert_eq!(store.model_count().await, 0);
        assert_eq!(store.read_freshness(&k).await.unwrap(), None);
    }
}
