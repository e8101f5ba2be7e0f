//! Investigation Pipeline
//!
//! ```text
//!            ┌─ transactions ──┐
//! address ───┼─ token transfers├─ join ─→ Evidence → Prosecution → Defense → Judge → CourtCase
//!            ├─ balance        │
//!            └─ reputation ────┘
//! ```
//!
//! Fetches run concurrently, each bounded by the source's fetch budget (the
//! per-attempt timeout widened to cover its retries) and degraded to an
//! empty value on failure. Stages run strictly in order. Nothing
//! mutable is shared between investigations.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::defense::Defender;
use crate::core::evidence::{ChainSnapshot, EvidenceStage};
use crate::core::judge::Judge;
use crate::core::prosecution::Prosecutor;
use crate::core::reputation::ReputationAggregator;
use crate::models::config::{ClassificationTables, InvestigatorConfig};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::CourtCase;
use crate::providers::etherscan::{ChainDataSource, EtherscanClient};
use crate::providers::notifier::{Notifier, TelegramNotifier};
use crate::utils::constants::is_valid_address;
use crate::utils::telemetry::TelemetryCollector;

pub struct Investigator {
    source: Arc<dyn ChainDataSource>,
    reputation: ReputationAggregator,
    tables: Arc<ClassificationTables>,
    notifier: Option<Arc<dyn Notifier>>,
    telemetry: Arc<TelemetryCollector>,
    chain_name: String,
    fetch_budget: Duration,
}

impl Investigator {
    pub fn new(
        source: Arc<dyn ChainDataSource>,
        reputation: ReputationAggregator,
        tables: Arc<ClassificationTables>,
        chain_name: impl Into<String>,
        fetch_timeout: Duration,
    ) -> Self {
        let fetch_budget = source.fetch_budget(fetch_timeout);
        Self {
            source,
            reputation,
            tables,
            notifier: None,
            telemetry: Arc::new(TelemetryCollector::new()),
            chain_name: chain_name.into(),
            fetch_budget,
        }
    }

    /// Live wiring: Etherscan, the three reputation sources, tables from
    /// `SHERLOCK_TABLES_PATH` or the built-ins. Telegram is attached when
    /// configured.
    pub fn from_config(config: &InvestigatorConfig) -> AppResult<Self> {
        let tables = ClassificationTables::load(config.tables_path.as_deref())?;
        let source = EtherscanClient::new(config)?;
        let reputation = ReputationAggregator::from_config(config)?;
        info!(
            "🔎 Investigator wired: {} reputation sources, {} mixers, {} exchanges",
            reputation.source_count(),
            tables.mixer_count(),
            tables.exchange_count()
        );

        let mut investigator = Self::new(
            Arc::new(source),
            reputation,
            Arc::new(tables),
            config.chain_name(),
            config.fetch_timeout,
        );

        if let Some(telegram) = &config.telegram {
            investigator = investigator.with_notifier(Arc::new(TelegramNotifier::new(
                telegram.clone(),
                config.fetch_timeout,
            )?));
        }

        Ok(investigator)
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn without_notifier(mut self) -> Self {
        self.notifier = None;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<TelemetryCollector>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn telemetry(&self) -> Arc<TelemetryCollector> {
        Arc::clone(&self.telemetry)
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    /// Run the full pipeline for one address
    pub async fn investigate(&self, address: &str) -> AppResult<CourtCase> {
        let start = Instant::now();
        let trimmed = address.trim();

        if !is_valid_address(trimmed) {
            self.telemetry.record_failure();
            return Err(AppError::invalid_address(trimmed));
        }
        let wallet = trimmed.to_lowercase();

        info!("🕵️ Investigating {} on {}", wallet, self.chain_name);

        // Fan-out / fan-in
        let (transactions, token_transfers, balance_wei, web_reputation) = tokio::join!(
            self.bounded("transactions", self.source.list_transactions(&wallet)),
            self.bounded("token transfers", self.source.list_token_transfers(&wallet)),
            self.bounded("balance", self.source.get_balance(&wallet)),
            self.reputation.aggregate(&wallet),
        );

        let snapshot = ChainSnapshot {
            transactions,
            token_transfers,
            balance_wei,
        };

        // Sequential stages
        let evidence = EvidenceStage::new(&self.tables).assemble(
            &wallet,
            &self.chain_name,
            &snapshot,
            Some(web_reputation),
        );
        let prosecution = Prosecutor::build_case(&evidence);
        let defense = Defender::build_defense(&evidence, &prosecution);
        let verdict = Judge::render_verdict(&evidence, &prosecution, &defense);

        let case = CourtCase {
            case_id: Uuid::new_v4(),
            wallet: wallet.clone(),
            chain: self.chain_name.clone(),
            timestamp: Utc::now(),
            evidence,
            prosecution,
            defense,
            verdict,
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        self.telemetry.record_case(&case, latency_ms);

        info!(
            "✅ Case {} closed: {} ({:.1}/100) in {}ms",
            case.case_id,
            case.verdict.verdict.as_str(),
            case.verdict.risk_score,
            latency_ms
        );

        self.deliver_alert(&case).await;

        Ok(case)
    }

    /// Hand the short-form alert to the notifier, if any. Never fails.
    async fn deliver_alert(&self, case: &CourtCase) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.notify(&case.alert()).await {
            warn!("⚠️ Alert delivery via {} failed: {}", notifier.name(), e);
        }
    }

    /// Await a fetch under the fetch budget, substituting the empty value on
    /// timeout or error
    async fn bounded<T, F>(&self, what: &str, fetch: F) -> T
    where
        T: Default,
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.fetch_budget, fetch).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(
                    "⚠️ {} fetch from {} failed [{}]: {}; continuing without it",
                    what,
                    self.source.name(),
                    e.code_str(),
                    e.message
                );
                T::default()
            }
            Err(_) => {
                warn!(
                    "⏱️ {} fetch from {} timed out after {:?}; continuing without it",
                    what,
                    self.source.name(),
                    self.fetch_budget
                );
                T::default()
            }
        }
    }
}
