//! Configuration module for ChainSherlock
//!
//! Everything is read from the environment once at process start. Defaults
//! come from utils/constants.rs.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    get_chain_name, get_explorer_url, is_chain_supported, CHAIN_ID_ETHEREUM,
    DEFAULT_EXCHANGES, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, DEFAULT_MIXERS,
    ETHERSCAN_API_URL,
};

/// Static address classification, immutable after load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTables {
    mixers: HashSet<String>,
    exchanges: HashSet<String>,
}

/// On-disk shape: `{ "mixers": [...], "exchanges": [...] }`
#[derive(Debug, Deserialize)]
struct TablesFile {
    #[serde(default)]
    mixers: Vec<String>,
    #[serde(default)]
    exchanges: Vec<String>,
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self::new(DEFAULT_MIXERS, DEFAULT_EXCHANGES)
    }
}

impl ClassificationTables {
    pub fn new<M, E>(mixers: M, exchanges: E) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            mixers: mixers.into_iter().map(|a| a.as_ref().trim().to_lowercase()).collect(),
            exchanges: exchanges
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Parse a JSON tables document
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let file: TablesFile = serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigTablesUnreadable,
                "Classification tables are not valid JSON",
                e,
            )
        })?;
        Ok(Self::new(file.mixers, file.exchanges))
    }

    /// Load from a JSON file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigTablesUnreadable,
                format!("Cannot read classification tables at {}", path.display()),
                e,
            )
        })?;
        Self::from_json(&raw)
    }

    /// File when configured, built-in lists otherwise
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let tables = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        info!(
            "📚 Classification tables loaded: {} mixers, {} exchanges",
            tables.mixers.len(),
            tables.exchanges.len()
        );
        Ok(tables)
    }

    #[inline]
    pub fn is_mixer(&self, address: &str) -> bool {
        self.mixers.contains(&address.to_lowercase())
    }

    #[inline]
    pub fn is_exchange(&self, address: &str) -> bool {
        self.exchanges.contains(&address.to_lowercase())
    }

    pub fn mixer_count(&self) -> usize {
        self.mixers.len()
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.len()
    }
}

/// Telegram delivery settings
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    /// Present only when both variables are set and non-empty
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok().filter(|v| !v.is_empty())?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok().filter(|v| !v.is_empty())?;
        info!("🔑 TELEGRAM_BOT_TOKEN configured (token hidden)");
        Some(Self { bot_token, chat_id })
    }
}

/// Configuration for an investigator instance
#[derive(Debug, Clone)]
pub struct InvestigatorConfig {
    /// Etherscan API key (never logged)
    pub etherscan_api_key: String,
    pub etherscan_api_url: String,
    pub chain_id: u64,
    /// Upper bound for each external fetch
    pub fetch_timeout: Duration,
    /// Retries for retryable fetch failures, 0 disables
    pub max_retries: u32,
    pub tables_path: Option<PathBuf>,
    pub telegram: Option<TelegramConfig>,
}

impl Default for InvestigatorConfig {
    fn default() -> Self {
        Self {
            etherscan_api_key: String::new(),
            etherscan_api_url: ETHERSCAN_API_URL.to_string(),
            chain_id: CHAIN_ID_ETHEREUM,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            tables_path: None,
            telegram: None,
        }
    }
}

impl InvestigatorConfig {
    /// Read configuration from the environment
    pub fn from_env() -> AppResult<Self> {
        let etherscan_api_key = std::env::var("ETHERSCAN_API_KEY")
            .ok()
            .filter(|k| !k.is_empty() && k != "YOUR_API_KEY")
            .ok_or_else(|| AppError::missing_api_key("ETHERSCAN_API_KEY"))?;
        info!("🔑 ETHERSCAN_API_KEY configured (key hidden for security)");

        let chain_id = check_chain_id(parse_env("SHERLOCK_CHAIN_ID", CHAIN_ID_ETHEREUM)?)?;

        Ok(Self {
            etherscan_api_key,
            etherscan_api_url: std::env::var("ETHERSCAN_API_URL")
                .unwrap_or_else(|_| ETHERSCAN_API_URL.to_string()),
            chain_id,
            fetch_timeout: Duration::from_secs(parse_env(
                "SHERLOCK_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            max_retries: parse_env("SHERLOCK_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            tables_path: std::env::var("SHERLOCK_TABLES_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            telegram: TelegramConfig::from_env(),
        })
    }

    /// Switch chains, rejecting ids without an explorer mapping
    pub fn with_chain_id(mut self, chain_id: u64) -> AppResult<Self> {
        self.chain_id = check_chain_id(chain_id)?;
        Ok(self)
    }

    pub fn chain_name(&self) -> &'static str {
        get_chain_name(self.chain_id)
    }

    pub fn explorer_url(&self) -> &'static str {
        get_explorer_url(self.chain_id)
    }
}

fn check_chain_id(chain_id: u64) -> AppResult<u64> {
    if is_chain_supported(chain_id) {
        Ok(chain_id)
    } else {
        Err(AppError::invalid_config(format!(
            "Unsupported chain_id: {}",
            chain_id
        )))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_config(format!("{} has invalid value '{}'", key, raw))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_match_case_insensitively() {
        let tables = ClassificationTables::default();
        assert!(tables.is_mixer("0x910CBD523D972EB0A6F4CAE4618AD62622B39DBF"));
        assert!(tables.is_exchange("0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be"));
        assert!(!tables.is_mixer("0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be"));
        assert_eq!(tables.mixer_count(), 5);
    }

    #[test]
    fn test_tables_from_json() {
        let tables = ClassificationTables::from_json(
            r#"{ "mixers": ["0xABC"], "exchanges": [" 0xDef "] }"#,
        )
        .unwrap();
        assert!(tables.is_mixer("0xabc"));
        assert!(tables.is_exchange("0xDEF"));
        assert_eq!(tables.exchange_count(), 1);
    }

    #[test]
    fn test_tables_missing_section_defaults_empty() {
        let tables = ClassificationTables::from_json(r#"{ "mixers": ["0x1"] }"#).unwrap();
        assert_eq!(tables.exchange_count(), 0);
    }

    #[test]
    fn test_tables_invalid_json() {
        let err = ClassificationTables::from_json("[1, 2").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigTablesUnreadable);
    }

    #[test]
    fn test_tables_missing_file() {
        let err = ClassificationTables::load(Some(Path::new("/nonexistent/tables.json")))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigTablesUnreadable);
    }

    #[test]
    fn test_default_config() {
        let config = InvestigatorConfig::default();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.chain_name(), "Ethereum Mainnet");
        assert_eq!(config.explorer_url(), "https://etherscan.io");
    }

    #[test]
    fn test_chain_override_is_checked() {
        let config = InvestigatorConfig::default().with_chain_id(56).unwrap();
        assert_eq!(config.explorer_url(), "https://bscscan.com");

        let err = InvestigatorConfig::default().with_chain_id(999_999).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
        assert!(err.message.contains("999999"));
    }
}
