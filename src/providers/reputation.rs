//! Reputation Sources
//!
//! Each source answers one question about an address: has anyone flagged
//! it? A source yields at most one report. Reaching the source is its own
//! problem; the aggregator in `core::reputation` treats any error as "no
//! result".
//!
//! - `EtherscanLabelSource`: explorer address page, scanned for label markers
//! - `ChainAbuseSource`: community abuse reports (JSON)
//! - `AddressPatternSource`: offline address-shape heuristic

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::core::patterns::longest_repeat_run;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::ReputationReport;
use crate::utils::constants::{BROWSER_USER_AGENT, CHAINABUSE_API_URL, USER_AGENT as USER_AGENT_CONST};

/// A single reputation lookup
#[async_trait]
pub trait ReputationSource: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the source has nothing to say about the address
    async fn check(&self, address: &str) -> AppResult<Option<ReputationReport>>;
}

fn build_client(user_agent: &'static str, accept: &'static str, timeout: Duration) -> AppResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static(accept));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(AppError::from)
}

// ============================================
// ETHERSCAN LABELS
// ============================================

/// Label markers the explorer shows on flagged addresses
pub const ETHERSCAN_SCAM_LABELS: [&str; 8] = [
    "Fake_Phishing",
    "Phish / Hack",
    "Scam",
    "MEV Bot",
    "Tornado.Cash",
    "Sanctioned",
    "Heist",
    "Exploiter",
];

pub struct EtherscanLabelSource {
    client: reqwest::Client,
    explorer_url: String,
}

impl EtherscanLabelSource {
    /// `explorer_url` is the site root, e.g. `https://etherscan.io`
    pub fn new(explorer_url: &str, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_client(BROWSER_USER_AGENT, "text/html", timeout)?,
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
        })
    }

    /// Markers present in the page, in table order
    pub fn find_labels(html: &str) -> Vec<&'static str> {
        ETHERSCAN_SCAM_LABELS
            .iter()
            .copied()
            .filter(|label| html.contains(label))
            .collect()
    }
}

#[async_trait]
impl ReputationSource for EtherscanLabelSource {
    fn name(&self) -> &str {
        "Etherscan Labels"
    }

    async fn check(&self, address: &str) -> AppResult<Option<ReputationReport>> {
        let url = format!("{}/address/{}", self.explorer_url, address);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::reputation_unavailable(
                self.name(),
                format!("HTTP {}", response.status().as_u16()),
            ));
        }

        let html = response.text().await?;
        let labels = Self::find_labels(&html);
        debug!("🏷️ Etherscan labels for {}: {:?}", address, labels);

        if labels.is_empty() {
            return Ok(None);
        }

        Ok(Some(ReputationReport {
            source: self.name().to_string(),
            is_scam: true,
            details: format!("Flagged as: {}", labels.join(", ")),
            url: Some(url),
        }))
    }
}

// ============================================
// CHAINABUSE
// ============================================

#[derive(Debug, Deserialize)]
struct ChainAbuseResponse {
    #[serde(default)]
    reports: Vec<ChainAbuseReport>,
}

#[derive(Debug, Deserialize)]
struct ChainAbuseReport {
    #[serde(default)]
    category: Option<String>,
}

pub struct ChainAbuseSource {
    client: reqwest::Client,
    api_url: String,
}

impl ChainAbuseSource {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Self::with_api_url(CHAINABUSE_API_URL, timeout)
    }

    /// Point at a different API root (the part before `/{address}`)
    pub fn with_api_url(api_url: &str, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_client(USER_AGENT_CONST, "application/json", timeout)?,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReputationSource for ChainAbuseSource {
    fn name(&self) -> &str {
        "ChainAbuse Community Reports"
    }

    async fn check(&self, address: &str) -> AppResult<Option<ReputationReport>> {
        let url = format!("{}/{}", self.api_url, address);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::reputation_unavailable(
                self.name(),
                format!("HTTP {}", response.status().as_u16()),
            ));
        }

        let body: ChainAbuseResponse = response.json().await?;
        if body.reports.is_empty() {
            return Ok(None);
        }

        let categories: Vec<&str> = body
            .reports
            .iter()
            .map(|r| r.category.as_deref().unwrap_or("unknown"))
            .collect();

        Ok(Some(ReputationReport {
            source: self.name().to_string(),
            is_scam: true,
            details: format!(
                "{} scam report(s) filed. Categories: {}",
                body.reports.len(),
                categories.join(", ")
            ),
            url: Some(format!("https://www.chainabuse.com/address/{}", address)),
        }))
    }
}

// ============================================
// ADDRESS PATTERN
// ============================================

pub const PATTERN_MIN_ZERO_DIGITS: usize = 10;
pub const PATTERN_MIN_REPEAT_RUN: usize = 7;
pub const KNOWN_SCAM_PREFIXES: [&str; 3] = ["0x00000", "0xdead", "0x0000000000"];

/// Offline heuristic, stricter than the detector's vanity rule
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressPatternSource;

impl AddressPatternSource {
    pub fn evaluate(address: &str) -> Option<ReputationReport> {
        let lower = address.to_lowercase();
        // Counted over the whole string, the 0x prefix included
        let zeros = lower.matches('0').count();
        let repeating = longest_repeat_run(&lower) >= PATTERN_MIN_REPEAT_RUN;
        let scam_prefix = KNOWN_SCAM_PREFIXES.iter().any(|p| lower.starts_with(p));

        if zeros < PATTERN_MIN_ZERO_DIGITS && !repeating && !scam_prefix {
            return None;
        }

        Some(ReputationReport {
            source: "Pattern Analysis".to_string(),
            is_scam: true,
            details: format!(
                "Suspicious vanity address pattern detected. {} zeros, repeating chars: {}, known scam prefix: {}",
                zeros, repeating, scam_prefix
            ),
            url: None,
        })
    }
}

#[async_trait]
impl ReputationSource for AddressPatternSource {
    fn name(&self) -> &str {
        "Pattern Analysis"
    }

    async fn check(&self, address: &str) -> AppResult<Option<ReputationReport>> {
        Ok(Self::evaluate(address))
    }
}
