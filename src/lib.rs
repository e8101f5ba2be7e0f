//! ChainSherlock Library
//!
//! Wallet fraud investigation engine. For a single address it:
//! - Builds an evidence graph of counterparties (mixers, exchanges, contracts)
//! - Runs behavioral pattern heuristics over the transaction history
//! - Aggregates public reputation sources
//! - Argues the case through Prosecution, Defense and Judge stages
//!
//! The result is a `CourtCase` with a verdict and a risk score in [0, 100].

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::Investigator;
pub use models::{
    AlertNotification, AppError, AppResult, ClassificationTables, CourtCase, ErrorCode,
    InvestigatorConfig, Verdict,
};
pub use utils::telemetry::{InvestigationStats, TelemetryCollector};
