//! Remote boundary contract and wire-shaped response types.
//!
//! The transport layer (signing, retries, HTTP status handling, JSON
//! parsing) lives behind [`RemoteStatsFetcher`]; this crate only sees
//! already-parsed raw responses. Failures arrive pre-classified as
//! [`StatsError::Network`] or [`StatsError::Api`] — nothing here inspects
//! status codes.

use async_trait::async_trait;
use serde::Deserialize;
use sitemetrics_core::{Granularity, ReferenceDate, SiteId, StatsResult};

use crate::traits::CachedMetric;

/// Network collaborator producing raw stats responses.
///
/// `count` always equals the caller-visible limit plus one: the extra slot
/// lets the coordinator detect "more items exist" without a separate count
/// endpoint. Implementations own retry/timeout/auth policy; this subsystem
/// performs no retries of its own.
#[async_trait]
pub trait RemoteStatsFetcher<T: CachedMetric>: Send + Sync {
    async fn fetch(
        &self,
        site: SiteId,
        granularity: Granularity,
        date: ReferenceDate,
        count: usize,
        forced: bool,
    ) -> StatsResult<T::Raw>;
}

// ============================================================================
// RAW RESPONSE SHAPES
// ============================================================================

/// A referrer as delivered by the upstream endpoint, nested at most one
/// level deep. Grandchildren, if a server ever sends them, are dropped
/// during mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawReferrer {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub children: Vec<RawReferrer>,
}

/// A referrer group as delivered by the upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawReferrerGroup {
    pub name: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub referrers: Vec<RawReferrer>,
}

/// Parsed referrers payload handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawReferrersResponse {
    pub groups: Vec<RawReferrerGroup>,
}

/// A search term row as delivered by the upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSearchTerm {
    pub term: String,
    #[serde(default)]
    pub views: u64,
}

/// Parsed search-terms payload handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSearchTermsResponse {
    pub terms: Vec<RawSearchTerm>,
}
