//! Sitemetrics Test Utilities
//!
//! Centralized test infrastructure for the sitemetrics workspace:
//! - A manually advanced clock for deterministic cache-expiry tests
//! - Scripted fetcher and spam-reporter collaborators that record calls
//! - Fixture builders for referrer trees and raw responses

// Re-export core types for convenience
pub use sitemetrics_core::{
    Clock, FreshnessRecord, Granularity, LimitMode, MetricType, ReferenceDate, Referrer,
    ReferrerGroup, ReferrerTree, SearchTerm, SearchTermList, SiteId, StatsCacheConfig,
    StatsError, StatsRequestKey, StatsResult, Timestamp,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use sitemetrics_cache::{
    CachedMetric, ModerationReceipt, RawReferrer, RawReferrerGroup, RawReferrersResponse,
    RawSearchTerm, RawSearchTermsResponse, RemoteStatsFetcher, SpamReporter,
};

// ============================================================================
// CLOCK
// ============================================================================

/// Clock that only moves when the test says so.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at a fixed, arbitrary instant.
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).expect("duration out of range");
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// SCRIPTED FETCHER
// ============================================================================

/// One recorded call into a [`ScriptedFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub site: SiteId,
    pub granularity: Granularity,
    pub date: ReferenceDate,
    pub count: usize,
    pub forced: bool,
}

/// Fetcher that replays a queue of scripted results and records every call.
///
/// When the script runs dry the fetcher fails with an API error, so a test
/// that accidentally reaches the network collaborator one time too many
/// fails loudly instead of fabricating data.
pub struct ScriptedFetcher<R> {
    script: Mutex<VecDeque<StatsResult<R>>>,
    calls: Mutex<Vec<FetchCall>>,
}

impl<R> ScriptedFetcher<R> {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue the next result to hand out.
    pub fn push(&self, result: StatsResult<R>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<FetchCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl<R> Default for ScriptedFetcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> RemoteStatsFetcher<T> for ScriptedFetcher<T::Raw>
where
    T: CachedMetric,
{
    async fn fetch(
        &self,
        site: SiteId,
        granularity: Granularity,
        date: ReferenceDate,
        count: usize,
        forced: bool,
    ) -> StatsResult<T::Raw> {
        self.calls.lock().unwrap().push(FetchCall {
            site,
            granularity,
            date,
            count,
            forced,
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StatsError::api("scripted fetcher exhausted")))
    }
}

// ============================================================================
// SCRIPTED SPAM REPORTER
// ============================================================================

/// One recorded call into a [`ScriptedSpamReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationCall {
    pub site: SiteId,
    pub domain: String,
    pub report: bool,
}

/// Spam reporter that succeeds by default and records every call; a queued
/// error makes the next call fail instead.
#[derive(Default)]
pub struct ScriptedSpamReporter {
    errors: Mutex<VecDeque<StatsError>>,
    calls: Mutex<Vec<ModerationCall>>,
}

impl ScriptedSpamReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, err: StatsError) {
        self.errors.lock().unwrap().push_back(err);
    }

    pub fn calls(&self) -> Vec<ModerationCall> {
        self.calls.lock().unwrap().clone()
    }

    fn call(&self, site: SiteId, domain: &str, report: bool) -> StatsResult<ModerationReceipt> {
        if let Some(err) = self.errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.calls.lock().unwrap().push(ModerationCall {
            site,
            domain: domain.to_string(),
            report,
        });
        Ok(ModerationReceipt {
            domain: domain.to_string(),
            marked_as_spam: report,
        })
    }
}

#[async_trait]
impl SpamReporter for ScriptedSpamReporter {
    async fn report_spam(&self, site: SiteId, domain: &str) -> StatsResult<ModerationReceipt> {
        self.call(site, domain, true)
    }

    async fn unreport_spam(&self, site: SiteId, domain: &str) -> StatsResult<ModerationReceipt> {
        self.call(site, domain, false)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Two-group tree with a nested child, mirroring typical referrer data.
pub fn sample_referrer_tree() -> ReferrerTree {
    ReferrerTree::new(vec![
        ReferrerGroup::new(
            "url_group_1.com",
            120,
            vec![
                Referrer::new("john.com", "https://john.com", 80).with_children(vec![
                    Referrer::new("child.com", "https://child.com/post", 30),
                ]),
                Referrer::new("jane.com", "https://jane.com", 40),
            ],
        ),
        ReferrerGroup::new(
            "url_group_2.com",
            55,
            vec![Referrer::new("bob.com", "https://bob.com", 55)],
        ),
    ])
}

/// Raw referrers payload with `group_count` single-referrer groups.
pub fn raw_referrer_groups(group_count: usize) -> RawReferrersResponse {
    RawReferrersResponse {
        groups: (0..group_count)
            .map(|i| RawReferrerGroup {
                name: format!("group-{}.com", i),
                total: (group_count - i) as u64 * 10,
                referrers: vec![RawReferrer {
                    name: format!("referrer-{}.com", i),
                    url: Some(format!("https://referrer-{}.com", i)),
                    views: (group_count - i) as u64 * 10,
                    children: vec![],
                }],
            })
            .collect(),
    }
}

/// Raw search-terms payload with `term_count` ranked terms.
pub fn raw_search_terms(term_count: usize) -> RawSearchTermsResponse {
    RawSearchTermsResponse {
        terms: (0..term_count)
            .map(|i| RawSearchTerm {
                term: format!("term-{}", i),
                views: (term_count - i) as u64,
            })
            .collect(),
    }
}
