//! Pattern Detector
//!
//! Six independent heuristics over the target's transaction list. Every
//! heuristic is evaluated on every call; none short-circuits another.
//!
//! | Heuristic         | Trigger                                        | Indicator                     |
//! |-------------------|------------------------------------------------|-------------------------------|
//! | Vanity address    | ≥8 zero digits or a run of ≥6 equal characters | exploit_contract_interaction  |
//! | New wallet burst  | age < 7 days and > 50 transactions             | new_wallet_pattern            |
//! | High volume spike | total in or total out > 100                    | high_volume_spike             |
//! | Dust attack       | > 20 incoming transfers in (0, 0.001)          | -                             |
//! | Rapid drain       | > 5 outgoing transfers ≤ 300s after the last   | -                             |
//! | Honeypot          | total in > 0.1 and total out == 0              | -                             |

use tracing::debug;

use crate::models::types::{DetectedPattern, PatternKind, RiskIndicators, Transaction};
use crate::utils::constants::SECONDS_PER_DAY;

// ============================================
// THRESHOLDS
// ============================================

pub const VANITY_MIN_ZERO_DIGITS: usize = 8;
pub const VANITY_MIN_REPEAT_RUN: usize = 6;

pub const BURST_MAX_AGE_DAYS: f64 = 7.0;
pub const BURST_MIN_TX_COUNT: usize = 50;

pub const VOLUME_SPIKE_ETH: f64 = 100.0;

pub const DUST_MAX_VALUE_ETH: f64 = 0.001;
pub const DUST_MIN_COUNT: usize = 20;

pub const RAPID_DRAIN_WINDOW_SECS: u64 = 300;
pub const RAPID_DRAIN_MIN_COUNT: usize = 5;

pub const HONEYPOT_MIN_IN_ETH: f64 = 0.1;

// ============================================
// ADDRESS SHAPE HELPERS
// ============================================

/// Hex digits after the `0x` prefix
fn hex_body(address: &str) -> &str {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address)
}

/// Number of `0` digits in the address body
pub fn count_zero_digits(address: &str) -> usize {
    hex_body(address).chars().filter(|c| *c == '0').count()
}

/// Length of the longest run of one repeated character (case-insensitive)
pub fn longest_repeat_run(address: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<char> = None;

    for c in hex_body(address).chars().map(|c| c.to_ascii_lowercase()) {
        if Some(c) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }

    longest
}

// ============================================
// DETECTOR
// ============================================

/// Detector output: patterns in heuristic order plus the flags they raised
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternScan {
    pub patterns: Vec<DetectedPattern>,
    pub indicators: RiskIndicators,
}

impl PatternScan {
    pub fn has(&self, kind: PatternKind) -> bool {
        self.patterns.iter().any(|p| p.kind == kind)
    }
}

pub struct PatternDetector;

impl PatternDetector {
    /// Run every heuristic. `total_in` / `total_out` come from the graph scan.
    pub fn detect(
        target: &str,
        transactions: &[Transaction],
        total_in: f64,
        total_out: f64,
    ) -> PatternScan {
        let mut scan = PatternScan::default();

        Self::vanity_address(target, &mut scan);
        Self::new_wallet_burst(transactions, &mut scan);
        Self::high_volume_spike(transactions, total_in, total_out, &mut scan);
        Self::dust_attack(target, transactions, &mut scan);
        Self::rapid_drain(target, transactions, &mut scan);
        Self::honeypot(transactions, total_in, total_out, &mut scan);

        debug!(
            "🔍 Pattern scan for {}: {} pattern(s) over {} transactions",
            target,
            scan.patterns.len(),
            transactions.len()
        );

        scan
    }

    fn vanity_address(target: &str, scan: &mut PatternScan) {
        let zeros = count_zero_digits(target);
        let run = longest_repeat_run(target);

        if zeros >= VANITY_MIN_ZERO_DIGITS || run >= VANITY_MIN_REPEAT_RUN {
            scan.indicators.exploit_contract_interaction = true;
            scan.patterns.push(DetectedPattern::new(
                PatternKind::VanityAddress,
                format!(
                    "Address contains {} zero digits and a {}-character repeat run",
                    zeros, run
                ),
            ));
        }
    }

    fn new_wallet_burst(transactions: &[Transaction], scan: &mut PatternScan) {
        let (Some(first), Some(last)) = (transactions.first(), transactions.last()) else {
            return;
        };
        let age_days = last.timestamp.abs_diff(first.timestamp) as f64 / SECONDS_PER_DAY as f64;

        if age_days < BURST_MAX_AGE_DAYS && transactions.len() > BURST_MIN_TX_COUNT {
            scan.indicators.new_wallet_pattern = true;
            scan.patterns.push(DetectedPattern::new(
                PatternKind::NewWalletBurst,
                format!(
                    "High activity on newly created wallet ({} transactions in {:.1} days)",
                    transactions.len(),
                    age_days
                ),
            ));
        }
    }

    fn high_volume_spike(
        transactions: &[Transaction],
        total_in: f64,
        total_out: f64,
        scan: &mut PatternScan,
    ) {
        if transactions.is_empty() {
            return;
        }
        if total_in > VOLUME_SPIKE_ETH || total_out > VOLUME_SPIKE_ETH {
            scan.indicators.high_volume_spike = true;
            scan.patterns.push(DetectedPattern::new(
                PatternKind::HighVolumeSpike,
                format!("{:.2} ETH in, {:.2} ETH out", total_in, total_out),
            ));
        }
    }

    fn dust_attack(target: &str, transactions: &[Transaction], scan: &mut PatternScan) {
        let dust = transactions
            .iter()
            .filter(|tx| tx.is_incoming(target))
            .filter(|tx| {
                let v = tx.value_eth();
                v > 0.0 && v < DUST_MAX_VALUE_ETH
            })
            .count();

        if dust > DUST_MIN_COUNT {
            scan.patterns.push(DetectedPattern::new(
                PatternKind::DustAttack,
                format!(
                    "{} incoming transfers below {} ETH",
                    dust, DUST_MAX_VALUE_ETH
                ),
            ));
        }
    }

    fn rapid_drain(target: &str, transactions: &[Transaction], scan: &mut PatternScan) {
        let rapid = transactions
            .windows(2)
            .filter(|pair| !pair[1].is_incoming(target))
            .filter(|pair| pair[1].timestamp.abs_diff(pair[0].timestamp) <= RAPID_DRAIN_WINDOW_SECS)
            .count();

        if rapid > RAPID_DRAIN_MIN_COUNT {
            scan.patterns.push(DetectedPattern::new(
                PatternKind::RapidDrain,
                format!(
                    "{} outgoing transfers within {} seconds of the previous transaction",
                    rapid, RAPID_DRAIN_WINDOW_SECS
                ),
            ));
        }
    }

    fn honeypot(
        transactions: &[Transaction],
        total_in: f64,
        total_out: f64,
        scan: &mut PatternScan,
    ) {
        if transactions.is_empty() {
            return;
        }
        if total_in > HONEYPOT_MIN_IN_ETH && total_out == 0.0 {
            scan.patterns.push(DetectedPattern::new(
                PatternKind::Honeypot,
                format!("Received {:.4} ETH with no outgoing transfers", total_in),
            ));
        }
    }
}
