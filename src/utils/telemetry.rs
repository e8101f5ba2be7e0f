//! Telemetry Module for ChainSherlock
//!
//! In-process counters over finished investigations, served by `/v1/stats`
//! and printed by the CLI at debug level.
//!
//! Privacy-first: no wallet addresses or case ids are stored

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::types::{CourtCase, PatternKind, Verdict};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InvestigationStats {
    /// Investigations that produced a verdict
    pub total_investigations: u64,
    /// Investigations rejected before a verdict (bad address)
    pub failed_investigations: u64,
    pub likely_fraud: u64,
    pub likely_clean: u64,
    pub inconclusive: u64,
    /// Detected patterns by kind marker
    pub patterns_by_kind: HashMap<String, u64>,
    /// Average end-to-end latency (ms)
    pub avg_latency_ms: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
}

impl InvestigationStats {
    /// Share of verdicts that came out as fraud, 0 without data
    pub fn fraud_rate(&self) -> f64 {
        if self.total_investigations == 0 {
            return 0.0;
        }
        self.likely_fraud as f64 / self.total_investigations as f64
    }

    /// Plain-text report
    pub fn summary(&self) -> String {
        let period_hours = self.period_end.saturating_sub(self.period_start) / 3600;
        format!(
            "🕵️ SHERLOCK REPORT ({}h)\n\
             Investigations: {} ({} failed)\n\
             Likely Fraud: {} | Inconclusive: {} | Likely Clean: {}\n\
             Fraud rate: {:.1}%\n\
             Avg latency: {:.1}ms",
            period_hours,
            self.total_investigations,
            self.failed_investigations,
            self.likely_fraud,
            self.inconclusive,
            self.likely_clean,
            self.fraud_rate() * 100.0,
            self.avg_latency_ms,
        )
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_investigations: AtomicU64,
    failed_investigations: AtomicU64,
    likely_fraud: AtomicU64,
    likely_clean: AtomicU64,
    inconclusive: AtomicU64,
    total_latency_ms: AtomicU64,
    pattern_counts: RwLock<HashMap<PatternKind, u64>>,
    session_start: u64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_investigations: AtomicU64::new(0),
            failed_investigations: AtomicU64::new(0),
            likely_fraud: AtomicU64::new(0),
            likely_clean: AtomicU64::new(0),
            inconclusive: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            pattern_counts: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
        }
    }

    /// Record a finished investigation
    pub fn record_case(&self, case: &CourtCase, latency_ms: u64) {
        self.total_investigations.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        let counter = match case.verdict.verdict {
            Verdict::LikelyFraud => &self.likely_fraud,
            Verdict::LikelyClean => &self.likely_clean,
            Verdict::Inconclusive => &self.inconclusive,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut counts) = self.pattern_counts.write() {
            for pattern in &case.evidence.high_risk_patterns {
                *counts.entry(pattern.kind).or_insert(0) += 1;
            }
        }
    }

    /// Record an investigation rejected before scoring
    pub fn record_failure(&self) {
        self.failed_investigations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> InvestigationStats {
        let total = self.total_investigations.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if total > 0 {
            total_latency as f64 / total as f64
        } else {
            0.0
        };

        let patterns_by_kind = self
            .pattern_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.marker().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        InvestigationStats {
            total_investigations: total,
            failed_investigations: self.failed_investigations.load(Ordering::Relaxed),
            likely_fraud: self.likely_fraud.load(Ordering::Relaxed),
            likely_clean: self.likely_clean.load(Ordering::Relaxed),
            inconclusive: self.inconclusive.load(Ordering::Relaxed),
            patterns_by_kind,
            avg_latency_ms: avg_latency,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
