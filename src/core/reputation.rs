//! Reputation Aggregator
//!
//! Queries every configured source concurrently and reduces whatever comes
//! back to a scam-report count plus a readable summary. A source that
//! errors or runs past the fetch timeout contributes nothing; the
//! aggregation itself never fails.

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::config::InvestigatorConfig;
use crate::models::errors::AppResult;
use crate::models::types::{ReputationReport, WebReputation};
use crate::providers::reputation::{
    AddressPatternSource, ChainAbuseSource, EtherscanLabelSource, ReputationSource,
};

pub const NO_RESULTS_SUMMARY: &str =
    "No public scam reports found in databases. However, this does not guarantee legitimacy.";
pub const CLEAN_SUMMARY: &str = "Wallet appears clean in public databases.";

pub struct ReputationAggregator {
    sources: Vec<Arc<dyn ReputationSource>>,
    timeout: Duration,
}

impl ReputationAggregator {
    pub fn new(sources: Vec<Arc<dyn ReputationSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    /// Explorer labels, ChainAbuse and the address-pattern heuristic
    pub fn from_config(config: &InvestigatorConfig) -> AppResult<Self> {
        let sources: Vec<Arc<dyn ReputationSource>> = vec![
            Arc::new(EtherscanLabelSource::new(
                config.explorer_url(),
                config.fetch_timeout,
            )?),
            Arc::new(ChainAbuseSource::new(config.fetch_timeout)?),
            Arc::new(AddressPatternSource),
        ];
        Ok(Self::new(sources, config.fetch_timeout))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Fan out to every source, wait for all of them, reduce
    pub async fn aggregate(&self, address: &str) -> WebReputation {
        let lookups = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                match tokio::time::timeout(self.timeout, source.check(address)).await {
                    Ok(Ok(report)) => report,
                    Ok(Err(e)) => {
                        warn!("⚠️ Reputation source '{}' failed: {}", source.name(), e);
                        None
                    }
                    Err(_) => {
                        warn!(
                            "⏱️ Reputation source '{}' timed out after {:?}",
                            source.name(),
                            self.timeout
                        );
                        None
                    }
                }
            }
        });

        let reports: Vec<ReputationReport> = join_all(lookups).await.into_iter().flatten().collect();
        debug!("🔎 {} reputation result(s) for {}", reports.len(), address);

        Self::reduce(reports)
    }

    pub fn reduce(reports: Vec<ReputationReport>) -> WebReputation {
        WebReputation {
            scam_reports: reports.iter().filter(|r| r.is_scam).count(),
            summary: Self::summarize(&reports),
            reports,
        }
    }

    pub fn summarize(reports: &[ReputationReport]) -> String {
        if reports.is_empty() {
            return NO_RESULTS_SUMMARY.to_string();
        }

        let flagged: Vec<&ReputationReport> = reports.iter().filter(|r| r.is_scam).collect();
        if flagged.is_empty() {
            return CLEAN_SUMMARY.to_string();
        }

        let mut summary = format!("🚨 SCAM ALERTS FOUND ({} source(s)):\n\n", flagged.len());
        for report in flagged {
            summary.push_str(&format!("• {}: {}\n", report.source, report.details));
            if let Some(url) = &report.url {
                summary.push_str(&format!("  Reference: {}\n", url));
            }
            summary.push('\n');
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::AppError;
    use async_trait::async_trait;

    struct Fixed(Option<ReputationReport>);

    #[async_trait]
    impl ReputationSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn check(&self, _address: &str) -> AppResult<Option<ReputationReport>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl ReputationSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        async fn check(&self, _address: &str) -> AppResult<Option<ReputationReport>> {
            Err(AppError::reputation_unavailable("failing", "unreachable"))
        }
    }

    struct Slow;

    #[async_trait]
    impl ReputationSource for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        async fn check(&self, _address: &str) -> AppResult<Option<ReputationReport>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some(report("slow", true)))
        }
    }

    fn report(source: &str, is_scam: bool) -> ReputationReport {
        ReputationReport {
            source: source.to_string(),
            is_scam,
            details: "details".to_string(),
            url: Some("https://example.org/ref".to_string()),
        }
    }

    #[test]
    fn test_live_wiring_has_three_sources() {
        let aggregator = ReputationAggregator::from_config(&InvestigatorConfig::default()).unwrap();
        assert_eq!(aggregator.source_count(), 3);
    }

    #[test]
    fn test_summary_variants() {
        assert_eq!(ReputationAggregator::summarize(&[]), NO_RESULTS_SUMMARY);
        assert_eq!(
            ReputationAggregator::summarize(&[report("a", false)]),
            CLEAN_SUMMARY
        );

        let summary = ReputationAggregator::summarize(&[report("Etherscan Labels", true), report("b", false)]);
        assert!(summary.starts_with("🚨 SCAM ALERTS FOUND (1 source(s)):"));
        assert!(summary.contains("• Etherscan Labels: details"));
        assert!(summary.contains("Reference: https://example.org/ref"));
        assert!(!summary.contains("• b:"));
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_other_sources() {
        let aggregator = ReputationAggregator::new(
            vec![
                Arc::new(Failing),
                Arc::new(Fixed(Some(report("community", true)))),
                Arc::new(Fixed(None)),
            ],
            Duration::from_secs(1),
        );
        let reputation = aggregator.aggregate("0xabc").await;
        assert_eq!(reputation.scam_reports, 1);
        assert_eq!(reputation.reports.len(), 1);
    }

    #[tokio::test]
    async fn test_slow_source_times_out_to_no_result() {
        let aggregator = ReputationAggregator::new(
            vec![Arc::new(Slow), Arc::new(Fixed(None))],
            Duration::from_millis(50),
        );
        let reputation = aggregator.aggregate("0xabc").await;
        assert_eq!(reputation.scam_reports, 0);
        assert_eq!(reputation.summary, NO_RESULTS_SUMMARY);
    }
}
