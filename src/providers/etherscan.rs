//! Etherscan v2 Chain Data Client
//!
//! Reads the target's transaction history from the Etherscan multichain API:
//! - `txlist`   → normal transactions (ascending)
//! - `tokentx`  → ERC-20 transfers (ascending)
//! - `balance`  → native balance in wei
//!
//! Envelope: `{ "status": "1", "message": "OK", "result": ... }`. Any other
//! status means "nothing to report" and maps to an empty result, except the
//! rate-limit notice which is retried like an HTTP 429.
//!
//! Retryable failures (timeouts, connection errors, 429, 5xx) back off
//! exponentially with ±20% jitter: 500ms → 1s → 2s → ... capped at 8s.

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::config::InvestigatorConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{TokenTransfer, Transaction};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Base retry delay in milliseconds
pub const RETRY_BASE_MS: u64 = 500;

/// Maximum retry delay in milliseconds
pub const RETRY_MAX_MS: u64 = 8_000;

/// Jitter percentage applied to each retry delay
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// Highest block number Etherscan accepts for `endblock`
const END_BLOCK: &str = "99999999";

/// Read access to an address's on-chain history
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Normal transactions, oldest first
    async fn list_transactions(&self, address: &str) -> AppResult<Vec<Transaction>>;

    /// ERC-20 transfers, oldest first
    async fn list_token_transfers(&self, address: &str) -> AppResult<Vec<TokenTransfer>>;

    /// Native balance in wei as a decimal string
    async fn get_balance(&self, address: &str) -> AppResult<String>;

    /// Wall-clock budget for one fetch including any internal retries,
    /// given the per-attempt timeout
    fn fetch_budget(&self, per_attempt: Duration) -> Duration {
        per_attempt
    }
}

// ============================================
// WIRE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct EtherscanEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// `txlist` row, every field is a string on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    hash: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    time_stamp: String,
    #[serde(default)]
    input: String,
    #[serde(default)]
    is_error: String,
    #[serde(default)]
    contract_address: String,
}

impl From<RawTransaction> for Transaction {
    fn from(raw: RawTransaction) -> Self {
        // contract creations leave `to` empty
        let to = if raw.to.is_empty() {
            raw.contract_address
        } else {
            raw.to
        };
        Self {
            hash: raw.hash,
            from: raw.from,
            to,
            value_wei: raw.value,
            timestamp: raw.time_stamp.trim().parse().unwrap_or(0),
            input_data: if raw.input.is_empty() {
                "0x".to_string()
            } else {
                raw.input
            },
            is_error: raw.is_error == "1",
        }
    }
}

/// `tokentx` row
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenTransfer {
    #[serde(default)]
    hash: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    token_name: String,
    #[serde(default)]
    token_symbol: String,
    #[serde(default)]
    contract_address: String,
    #[serde(default)]
    time_stamp: String,
}

impl From<RawTokenTransfer> for TokenTransfer {
    fn from(raw: RawTokenTransfer) -> Self {
        Self {
            hash: raw.hash,
            from: raw.from,
            to: raw.to,
            value: raw.value,
            token_name: raw.token_name,
            token_symbol: raw.token_symbol,
            contract_address: raw.contract_address,
            timestamp: raw.time_stamp.trim().parse().unwrap_or(0),
        }
    }
}

// ============================================
// CLIENT
// ============================================

/// Etherscan v2 API client
pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
    max_retries: u32,
    retry_base: Duration,
    request_timeout: Duration,
}

impl EtherscanClient {
    pub fn new(config: &InvestigatorConfig) -> AppResult<Self> {
        if config.etherscan_api_key.is_empty() {
            return Err(AppError::missing_api_key("ETHERSCAN_API_KEY"));
        }

        let client = Self::build_client(config.fetch_timeout)?;

        info!(
            "🌐 Etherscan client ready for {} (chain_id {}, {} retries)",
            config.chain_name(),
            config.chain_id,
            config.max_retries
        );

        Ok(Self {
            client,
            base_url: config.etherscan_api_url.trim_end_matches('/').to_string(),
            api_key: config.etherscan_api_key.clone(),
            chain_id: config.chain_id,
            max_retries: config.max_retries,
            retry_base: Duration::from_millis(RETRY_BASE_MS),
            request_timeout: config.fetch_timeout,
        })
    }

    /// Override the first retry delay (later retries double it)
    pub fn with_retry_base(mut self, delay: Duration) -> Self {
        self.retry_base = delay;
        self
    }

    /// HTTP client with fixed User-Agent and gzip
    fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(AppError::from)
    }

    /// Query one `module=account` action with retries. `None` when the
    /// API reports nothing for the address.
    async fn query(
        &self,
        action: &str,
        address: &str,
        extra: &[(&str, &str)],
    ) -> AppResult<Option<serde_json::Value>> {
        let chain_id = self.chain_id.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("chainid", chain_id.as_str()),
            ("module", "account"),
            ("action", action),
            ("address", address),
        ];
        params.extend_from_slice(extra);
        params.push(("apikey", self.api_key.as_str()));

        let mut attempt: u32 = 0;
        loop {
            match self.execute(&params).await {
                Ok(envelope) => {
                    debug!(
                        "📡 Etherscan {} for {}: status={} message={}",
                        action, address, envelope.status, envelope.message
                    );
                    if envelope.status == "1" {
                        return Ok(Some(envelope.result));
                    }
                    if is_rate_limit_notice(&envelope) {
                        let err = AppError::rate_limited();
                        if attempt >= self.max_retries {
                            return Err(err);
                        }
                        warn!(
                            "⏳ Etherscan rate limit notice, backing off (attempt {}/{})",
                            attempt + 1,
                            self.max_retries
                        );
                    } else {
                        return Ok(None);
                    }
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    warn!(
                        "⚠️ Etherscan {} failed: {} (attempt {}/{})",
                        action,
                        e,
                        attempt + 1,
                        self.max_retries
                    );
                }
                Err(e) => return Err(e),
            }

            attempt += 1;
            let delay = self.retry_delay(attempt);
            debug!("⏳ Retry {}/{} after {}ms", attempt, self.max_retries, delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    /// Worst case for every attempt timing out plus every backoff at its
    /// upper jitter bound
    pub fn total_budget(&self, per_attempt: Duration) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        let backoff_ms: u64 = (1..=self.max_retries)
            .map(|attempt| {
                let capped = self.backoff_ms(attempt);
                capped + (capped * RETRY_JITTER_PERCENT) / 100
            })
            .sum();
        per_attempt.saturating_mul(attempts) + Duration::from_millis(backoff_ms)
    }

    /// Un-jittered delay for the given retry number (1-based)
    fn backoff_ms(&self, attempt: u32) -> u64 {
        let base_ms = self.retry_base.as_millis() as u64;
        let exp = base_ms.saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)));
        exp.min(RETRY_MAX_MS.max(base_ms))
    }

    /// Exponential backoff with ±20% jitter for the given retry number (1-based)
    fn retry_delay(&self, attempt: u32) -> Duration {
        let capped = self.backoff_ms(attempt);

        let jitter_range = (capped * RETRY_JITTER_PERCENT) / 100;
        let jitter: i64 = if jitter_range == 0 {
            0
        } else {
            rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64))
        };
        Duration::from_millis((capped as i64 + jitter).max(0) as u64)
    }

    /// Single GET, no retries
    async fn execute(&self, params: &[(&str, &str)]) -> AppResult<EtherscanEnvelope> {
        let response = self.client.get(&self.base_url).query(params).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::rate_limited());
        }
        if status.is_server_error() {
            return Err(AppError::http_error(status.as_u16()));
        }
        if !status.is_success() {
            // 4xx other than 429 will not improve on retry
            return Err(AppError::invalid_response(format!(
                "Etherscan returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn is_rate_limit_notice(envelope: &EtherscanEnvelope) -> bool {
    envelope
        .result
        .as_str()
        .map(|r| r.to_lowercase().contains("rate limit"))
        .unwrap_or(false)
}

#[async_trait]
impl ChainDataSource for EtherscanClient {
    fn name(&self) -> &str {
        "etherscan"
    }

    fn fetch_budget(&self, per_attempt: Duration) -> Duration {
        self.total_budget(per_attempt.max(self.request_timeout))
    }

    async fn list_transactions(&self, address: &str) -> AppResult<Vec<Transaction>> {
        let extra = [("startblock", "0"), ("endblock", END_BLOCK), ("sort", "asc")];
        let Some(result) = self.query("txlist", address, &extra).await? else {
            return Ok(Vec::new());
        };
        let rows: Vec<RawTransaction> = serde_json::from_value(result)?;
        debug!("📥 {} transactions for {}", rows.len(), address);
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn list_token_transfers(&self, address: &str) -> AppResult<Vec<TokenTransfer>> {
        let extra = [("startblock", "0"), ("endblock", END_BLOCK), ("sort", "asc")];
        let Some(result) = self.query("tokentx", address, &extra).await? else {
            return Ok(Vec::new());
        };
        let rows: Vec<RawTokenTransfer> = serde_json::from_value(result)?;
        debug!("📥 {} token transfers for {}", rows.len(), address);
        Ok(rows.into_iter().map(TokenTransfer::from).collect())
    }

    async fn get_balance(&self, address: &str) -> AppResult<String> {
        let result = self.query("balance", address, &[("tag", "latest")]).await?;
        Ok(result
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| "0".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_retries: u32) -> EtherscanClient {
        let config = InvestigatorConfig {
            etherscan_api_key: "test-key".to_string(),
            max_retries,
            ..Default::default()
        };
        EtherscanClient::new(&config).unwrap()
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = EtherscanClient::new(&InvestigatorConfig::default()).err().unwrap();
        assert_eq!(err.code_str(), "CFG_MISSING_API_KEY");
    }

    #[test]
    fn test_raw_transaction_mapping() {
        let raw: RawTransaction = serde_json::from_value(serde_json::json!({
            "hash": "0xabc",
            "from": "0x1",
            "to": "",
            "value": "1000",
            "timeStamp": "not-a-number",
            "input": "",
            "isError": "1",
            "contractAddress": "0xc0ffee"
        }))
        .unwrap();
        let tx = Transaction::from(raw);
        assert_eq!(tx.to, "0xc0ffee");
        assert_eq!(tx.timestamp, 0);
        assert_eq!(tx.input_data, "0x");
        assert!(tx.is_error);
    }

    #[test]
    fn test_raw_token_transfer_mapping() {
        let raw: RawTokenTransfer = serde_json::from_value(serde_json::json!({
            "hash": "0xdef",
            "from": "0x1",
            "to": "0x2",
            "value": "5000000",
            "tokenName": "Tether USD",
            "tokenSymbol": "USDT",
            "contractAddress": "0xdac17f958d2ee523a2206206994597c13d831ec7",
            "timeStamp": "1700000000"
        }))
        .unwrap();
        let transfer = TokenTransfer::from(raw);
        assert_eq!(transfer.token_symbol, "USDT");
        assert_eq!(transfer.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_retry_delay_grows_and_caps() {
        let c = client(5);
        for _ in 0..20 {
            let first = c.retry_delay(1).as_millis() as u64;
            assert!((400..=600).contains(&first), "first delay {}", first);
            let late = c.retry_delay(10).as_millis() as u64;
            assert!(late <= RETRY_MAX_MS + RETRY_MAX_MS / 5);
        }
    }

    #[test]
    fn test_fetch_budget_covers_every_attempt() {
        let c = client(2);
        // 3 × 10s attempts + (500ms + 1000ms) backoff at +20%
        assert_eq!(
            c.fetch_budget(Duration::from_secs(10)),
            Duration::from_millis(30_000 + 600 + 1_200)
        );
        assert_eq!(client(0).fetch_budget(Duration::from_secs(10)), Duration::from_secs(10));
    }

    #[test]
    fn test_rate_limit_notice_detection() {
        let envelope: EtherscanEnvelope = serde_json::from_value(serde_json::json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached"
        }))
        .unwrap();
        assert!(is_rate_limit_notice(&envelope));

        let empty: EtherscanEnvelope = serde_json::from_value(serde_json::json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        }))
        .unwrap();
        assert!(!is_rate_limit_notice(&empty));
    }
}
