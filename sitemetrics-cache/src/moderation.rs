//! Remote spam moderation for referrers.
//!
//! Reporting a domain as spam is a remote operation; updating the cached
//! referrer tree is a local one. The two are deliberately not composed
//! here: callers apply [`sitemetrics_core::ReferrerTree::with_spam_flag`]
//! themselves after a successful remote call, and the remote result stays
//! authoritative even when no cached tree exists to update.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use sitemetrics_core::{SiteId, StatsResult};

/// Confirmation returned by the remote moderation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationReceipt {
    pub domain: String,
    /// Spam state of the domain after the call.
    pub marked_as_spam: bool,
}

/// Network collaborator for the spam-moderation endpoint.
#[async_trait]
pub trait SpamReporter: Send + Sync {
    /// Mark a referrer domain as spam.
    async fn report_spam(&self, site: SiteId, domain: &str) -> StatsResult<ModerationReceipt>;

    /// Remove the spam mark from a referrer domain.
    async fn unreport_spam(&self, site: SiteId, domain: &str) -> StatsResult<ModerationReceipt>;
}

/// Thin service over the reporter, adding logging at the moderation seam.
pub struct SpamModerationService<R: SpamReporter> {
    reporter: Arc<R>,
}

impl<R: SpamReporter> SpamModerationService<R> {
    pub fn new(reporter: Arc<R>) -> Self {
        Self { reporter }
    }

    /// Report a domain as spam. Never touches the cached tree.
    pub async fn report(&self, site: SiteId, domain: &str) -> StatsResult<ModerationReceipt> {
        debug!(site = %site, domain, "reporting referrer as spam");
        let receipt = self.reporter.report_spam(site, domain).await?;
        info!(site = %site, domain, "referrer reported as spam");
        Ok(receipt)
    }

    /// Remove a spam report for a domain. Never touches the cached tree.
    pub async fn unreport(&self, site: SiteId, domain: &str) -> StatsResult<ModerationReceipt> {
        debug!(site = %site, domain, "withdrawing spam report for referrer");
        let receipt = self.reporter.unreport_spam(site, domain).await?;
        info!(site = %site, domain, "spam report withdrawn");
        Ok(receipt)
    }
}

impl<R: SpamReporter> Clone for SpamModerationService<R> {
    fn clone(&self) -> Self {
        Self {
            reporter: Arc::clone(&self.reporter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitemetrics_core::StatsError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        calls: Mutex<Vec<(String, bool)>>,
        fail_next: Mutex<Option<StatsError>>,
    }

    #[async_trait]
    impl SpamReporter for RecordingReporter {
        async fn report_spam(&self, _site: SiteId, domain: &str) -> StatsResult<ModerationReceipt> {
            if let Some(err) = self.fail_next.lock().unwrap().take() {
                return Err(err);
            }
            self.calls.lock().unwrap().push((domain.to_string(), true));
            Ok(ModerationReceipt {
                domain: domain.to_string(),
                marked_as_spam: true,
            })
        }

        async fn unreport_spam(
            &self,
            _site: SiteId,
            domain: &str,
        ) -> StatsResult<ModerationReceipt> {
            self.calls.lock().unwrap().push((domain.to_string(), false));
            Ok(ModerationReceipt {
                domain: domain.to_string(),
                marked_as_spam: false,
            })
        }
    }

    #[tokio::test]
    async fn test_report_returns_remote_receipt() {
        let reporter = Arc::new(RecordingReporter::default());
        let service = SpamModerationService::new(reporter.clone());

        let receipt = service
            .report(SiteId::generate(), "john.com")
            .await
            .unwrap();
        assert_eq!(receipt.domain, "john.com");
        assert!(receipt.marked_as_spam);
        assert_eq!(
            reporter.calls.lock().unwrap().as_slice(),
            &[("john.com".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_unreport_returns_remote_receipt() {
        let reporter = Arc::new(RecordingReporter::default());
        let service = SpamModerationService::new(reporter.clone());

        let receipt = service
            .unreport(SiteId::generate(), "john.com")
            .await
            .unwrap();
        assert!(!receipt.marked_as_spam);
    }

    #[tokio::test]
    async fn test_remote_failure_surfaces_verbatim() {
        let reporter = Arc::new(RecordingReporter::default());
        *reporter.fail_next.lock().unwrap() = Some(StatsError::api("unknown_blog"));
        let service = SpamModerationService::new(reporter.clone());

        let err = service
            .report(SiteId::generate(), "john.com")
            .await
            .unwrap_err();
        assert_eq!(err, StatsError::api("unknown_blog"));
        assert!(reporter.calls.lock().unwrap().is_empty());
    }
}
