//! Constants Module - Single Source of Truth
//!
//! Application-wide constants, chain metadata, default classification
//! lists and unit conversion helpers. Other modules import from here
//! instead of hardcoding values.

use alloy_primitives::{Address, U256};
use std::str::FromStr;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "ChainSherlock";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "ChainSherlock/0.1.0";

/// Browser-like User-Agent for explorer pages that reject bot agents
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================
// FETCH CONSTANTS
// ============================================

/// Default timeout for a single external fetch (seconds)
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default retry count for retryable fetch failures
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Etherscan v2 multichain endpoint
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";

/// ChainAbuse public address endpoint
pub const CHAINABUSE_API_URL: &str = "https://www.chainabuse.com/api/address";

/// Telegram Bot API base
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

// ============================================
// CHAIN IDS
// ============================================

/// Ethereum Mainnet
pub const CHAIN_ID_ETHEREUM: u64 = 1;
/// BNB Smart Chain
pub const CHAIN_ID_BSC: u64 = 56;
/// Polygon
pub const CHAIN_ID_POLYGON: u64 = 137;
/// Arbitrum One
pub const CHAIN_ID_ARBITRUM: u64 = 42161;
/// Optimism
pub const CHAIN_ID_OPTIMISM: u64 = 10;
/// Base
pub const CHAIN_ID_BASE: u64 = 8453;

/// Chains served by the Etherscan v2 endpoint that we accept
pub const SUPPORTED_CHAIN_IDS: [u64; 6] = [
    CHAIN_ID_ETHEREUM,
    CHAIN_ID_BSC,
    CHAIN_ID_POLYGON,
    CHAIN_ID_ARBITRUM,
    CHAIN_ID_OPTIMISM,
    CHAIN_ID_BASE,
];

/// Get chain display name
pub fn get_chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_ID_ETHEREUM => "Ethereum Mainnet",
        CHAIN_ID_BSC => "BNB Smart Chain",
        CHAIN_ID_POLYGON => "Polygon",
        CHAIN_ID_ARBITRUM => "Arbitrum One",
        CHAIN_ID_OPTIMISM => "Optimism",
        CHAIN_ID_BASE => "Base",
        _ => "Unknown",
    }
}

/// Get block explorer URL
pub fn get_explorer_url(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_ID_ETHEREUM => "https://etherscan.io",
        CHAIN_ID_BSC => "https://bscscan.com",
        CHAIN_ID_POLYGON => "https://polygonscan.com",
        CHAIN_ID_ARBITRUM => "https://arbiscan.io",
        CHAIN_ID_OPTIMISM => "https://optimistic.etherscan.io",
        CHAIN_ID_BASE => "https://basescan.org",
        _ => "https://etherscan.io",
    }
}

/// Check if chain ID is supported
#[inline]
pub fn is_chain_supported(chain_id: u64) -> bool {
    SUPPORTED_CHAIN_IDS.contains(&chain_id)
}

// ============================================
// DEFAULT CLASSIFICATION TABLES
// ============================================

/// Built-in mixer set, used when no tables file is configured
pub const DEFAULT_MIXERS: [&str; 5] = [
    "0x8589427373d6d84e98730d7795d8f6f8731fda16", // Tornado Cash: TORN Token
    "0x47ce0c6ed5b0ce3d3a51fdb1c52dc66a7c3c2936", // Tornado Cash: 0.1 ETH
    "0x910cbd523d972eb0a6f4cae4618ad62622b39dbf", // Tornado Cash: 1 ETH
    "0xa160cdab225685da1d56aa342ad8841c3b53f291", // Tornado Cash: 10 ETH
    "0xd4b88df4d29f5cedd6857912842cff3b20c8cfa3", // Tornado Cash: Router
];

/// Built-in exchange hot-wallet set
pub const DEFAULT_EXCHANGES: [&str; 5] = [
    "0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be", // Binance
    "0xd551234ae421e3bcba99a0da6d736074f22192ff", // Binance
    "0x28c6c06298d514db089934071355e5743bf21d60", // Binance US
    "0x21a31ee1afc51d94c2efccaa2092ad1028285549", // Binance
    "0x0681d8db095565fe8a346fa0277bffde9c0edbbf", // Binance
];

// ============================================
// TIME
// ============================================

pub const SECONDS_PER_DAY: u64 = 60 * 60 * 24;

// ============================================
// CONVERSION UTILITIES
// ============================================

/// Convert wei to ETH (or native token)
#[inline]
pub fn wei_to_eth(wei: U256) -> f64 {
    let wei_u128: u128 = wei.try_into().unwrap_or(u128::MAX);
    wei_u128 as f64 / 1e18
}

/// Parse a decimal wei string into whole-token units.
///
/// Anything unparsable counts as zero so a single bad row never poisons
/// the aggregates.
pub fn parse_wei_to_eth(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    U256::from_str(trimmed).map(wei_to_eth).unwrap_or(0.0)
}

/// Validate a 0x-prefixed 20-byte hex address
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42 && address.starts_with("0x") && Address::from_str(address).is_ok()
}

/// `0x1234...abcd` form used in alerts
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_char_boundary(6) || !address.is_char_boundary(address.len() - 4) {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
