//! Cache store trait and cacheable metric marker.
//!
//! This module defines the trait a store backend must implement and the
//! marker trait tying each metric family to its raw wire shape, its cache
//! slot, and its truncation behavior.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sitemetrics_core::{
    FreshnessRecord, MetricType, Referrer, ReferrerGroup, ReferrerTree, SearchTerm,
    SearchTermList, StatsRequestKey, StatsResult,
};

use crate::remote::{RawReferrer, RawReferrersResponse, RawSearchTermsResponse};

/// Marker trait for metric models that can live in the stats cache.
///
/// # Implementation Requirements
///
/// - `metric_type()` must return a consistent value for all instances; it
///   selects the cache slot together with site, granularity, and date.
/// - `from_raw` maps the transport's parsed payload into the domain model.
/// - `truncated(limit)` must keep the first `limit` ranked items and report
///   via the model's `has_more` whether anything was cut off.
/// - Implementations must be `Clone`, `Serialize`, and `DeserializeOwned`
///   for cache storage, and `Send + Sync + 'static` for async use.
pub trait CachedMetric: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Parsed wire shape this model is mapped from.
    type Raw: Send + 'static;

    /// Get the metric family for this model.
    fn metric_type() -> MetricType;

    /// Map a raw response into the domain model.
    fn from_raw(raw: Self::Raw) -> Self;

    /// Shape the model down to the caller-visible item count.
    fn truncated(&self, limit: usize) -> Self;
}

/// Keyed persistence for cached models and the freshness ledger.
///
/// One cached model and one freshness record exist per [`StatsRequestKey`];
/// writes are last-write-wins. Backends are expected to be fast local
/// stores; there is no network I/O behind this trait.
#[async_trait]
pub trait StatsCacheStore: Send + Sync {
    /// Read the cached model for a slot, or `None` when the slot is empty.
    async fn read_model<T: CachedMetric>(
        &self,
        key: &StatsRequestKey,
    ) -> StatsResult<Option<T>>;

    /// Overwrite the cached model for a slot.
    async fn write_model<T: CachedMetric>(
        &self,
        key: &StatsRequestKey,
        model: &T,
    ) -> StatsResult<()>;

    /// Read the freshness record for a slot, or `None` when no successful
    /// fetch has been recorded.
    async fn read_freshness(&self, key: &StatsRequestKey) -> StatsResult<Option<FreshnessRecord>>;

    /// Overwrite the freshness record for a slot.
    async fn write_freshness(
        &self,
        key: &StatsRequestKey,
        record: &FreshnessRecord,
    ) -> StatsResult<()>;
}

// ============================================================================
// IMPLEMENTATIONS FOR METRIC MODELS
// ============================================================================

fn map_referrer(raw: RawReferrer, keep_children: bool) -> Referrer {
    let url = raw.url.unwrap_or_else(|| raw.name.clone());
    let children = if keep_children {
        // One nesting level only; anything deeper is dropped.
        raw.children
            .into_iter()
            .map(|c| map_referrer(c, false))
            .collect()
    } else {
        Vec::new()
    };
    Referrer {
        identifier: raw.name,
        url,
        total: raw.views,
        marked_as_spam: false,
        children,
    }
}

impl CachedMetric for ReferrerTree {
    type Raw = RawReferrersResponse;

    fn metric_type() -> MetricType {
        MetricType::Referrers
    }

    fn from_raw(raw: Self::Raw) -> Self {
        ReferrerTree::new(
            raw.groups
                .into_iter()
                .map(|g| ReferrerGroup {
                    identifier: g.name,
                    total: g.total,
                    marked_as_spam: false,
                    referrers: g
                        .referrers
                        .into_iter()
                        .map(|r| map_referrer(r, true))
                        .collect(),
                })
                .collect(),
        )
    }

    fn truncated(&self, limit: usize) -> Self {
        ReferrerTree::truncated(self, limit)
    }
}

impl CachedMetric for SearchTermList {
    type Raw = RawSearchTermsResponse;

    fn metric_type() -> MetricType {
        MetricType::SearchTerms
    }

    fn from_raw(raw: Self::Raw) -> Self {
        SearchTermList::new(
            raw.terms
                .into_iter()
                .map(|t| SearchTerm::new(t.term, t.views))
                .collect(),
        )
    }

    fn truncated(&self, limit: usize) -> Self {
        SearchTermList::truncated(self, limit)
    }
}
