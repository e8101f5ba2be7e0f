//! Providers Module - External Data Sources
//!
//! Chain data (Etherscan), public reputation sources and outbound alerting.

pub mod etherscan;
pub mod notifier;
pub mod reputation;

pub use etherscan::{ChainDataSource, EtherscanClient};
pub use notifier::{Notifier, TelegramNotifier};
pub use reputation::{AddressPatternSource, ChainAbuseSource, EtherscanLabelSource, ReputationSource};
