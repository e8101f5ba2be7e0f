//! Evidence Stage
//!
//! One pass of the graph builder and the pattern detector over the same
//! transaction list, plus derived metrics. The stage never invents a
//! conclusion of its own; `EvidenceSummary::conclusion` is only set when a
//! pre-assessed summary is handed to the judge.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::core::graph::GraphBuilder;
use crate::core::patterns::PatternDetector;
use crate::models::config::ClassificationTables;
use crate::models::types::{
    DetailedAnalysis, EvidenceSummary, TokenTransfer, Transaction, WebReputation,
};
use crate::utils::constants::{parse_wei_to_eth, SECONDS_PER_DAY};

/// Raw chain data gathered for one address
#[derive(Debug, Clone, Default)]
pub struct ChainSnapshot {
    pub transactions: Vec<Transaction>,
    pub token_transfers: Vec<TokenTransfer>,
    /// Native balance in wei, as the source returned it
    pub balance_wei: String,
}

pub struct EvidenceStage<'a> {
    tables: &'a ClassificationTables,
}

impl<'a> EvidenceStage<'a> {
    pub fn new(tables: &'a ClassificationTables) -> Self {
        Self { tables }
    }

    pub fn assemble(
        &self,
        wallet: &str,
        chain: &str,
        snapshot: &ChainSnapshot,
        web_reputation: Option<WebReputation>,
    ) -> EvidenceSummary {
        let txs = &snapshot.transactions;

        let build = GraphBuilder::new(self.tables).build(wallet, txs);
        let scan = PatternDetector::detect(wallet, txs, build.total_in, build.total_out);

        let mut indicators = build.indicators;
        indicators.merge(scan.indicators);

        let mut patterns = build.patterns;
        patterns.extend(scan.patterns);

        let analysis = analyze(txs, build.total_in, build.total_out);

        info!(
            "🧾 Evidence for {}: {} txs, {} counterparties, {} pattern(s)",
            wallet,
            txs.len(),
            build.counterparties.len(),
            patterns.len()
        );

        EvidenceSummary {
            wallet: wallet.to_string(),
            chain: chain.to_string(),
            first_seen: txs.first().and_then(|t| to_datetime(t.timestamp)),
            last_seen: txs.last().and_then(|t| to_datetime(t.timestamp)),
            total_in: build.total_in,
            total_out: build.total_out,
            net_flow: build.total_in - build.total_out,
            balance_eth: parse_wei_to_eth(&snapshot.balance_wei),
            tx_count: txs.len(),
            token_transfer_count: snapshot.token_transfers.len(),
            unique_counterparties: build.counterparties.len(),
            high_risk_patterns: patterns,
            graph: build.graph,
            risk_indicators: indicators,
            web_reputation,
            detailed_analysis: Some(analysis),
            conclusion: None,
        }
    }
}

fn to_datetime(timestamp: u64) -> Option<DateTime<Utc>> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

/// Derived metrics over the transaction list
pub fn analyze(transactions: &[Transaction], total_in: f64, total_out: f64) -> DetailedAnalysis {
    let (Some(first), Some(last)) = (transactions.first(), transactions.last()) else {
        return DetailedAnalysis {
            net_flow: total_in - total_out,
            ..Default::default()
        };
    };

    let count = transactions.len() as f64;
    let wallet_age_days = last.timestamp.abs_diff(first.timestamp) / SECONDS_PER_DAY;

    let values: Vec<f64> = transactions.iter().map(Transaction::value_eth).collect();
    let largest = values.iter().copied().fold(0.0_f64, f64::max);
    let smallest = values
        .iter()
        .copied()
        .filter(|v| *v > 0.0)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))))
        .unwrap_or(0.0);

    DetailedAnalysis {
        wallet_age_days,
        average_tx_value: (total_in + total_out) / count,
        net_flow: total_in - total_out,
        transaction_frequency: count / wallet_age_days.max(1) as f64,
        largest_transaction: largest,
        smallest_transaction: smallest,
    }
}
