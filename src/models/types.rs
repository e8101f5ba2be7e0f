//! Type definitions for ChainSherlock
//! All data contracts that flow through the investigation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::constants::{parse_wei_to_eth, short_address};

// ============================================
// CHAIN DATA
// ============================================

/// A normal (native value) transaction touching the target wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Value in wei as a decimal string
    pub value_wei: String,
    /// Unix seconds
    pub timestamp: u64,
    /// Call data, `0x` for plain transfers
    pub input_data: String,
    pub is_error: bool,
}

impl Transaction {
    /// Value in whole-token units, zero when unparsable
    pub fn value_eth(&self) -> f64 {
        parse_wei_to_eth(&self.value_wei)
    }

    /// True when `to` is the target (case-insensitive)
    pub fn is_incoming(&self, target: &str) -> bool {
        self.to.eq_ignore_ascii_case(target)
    }

    /// The address on the other side of the transfer, lowercased
    pub fn counterparty(&self, target: &str) -> String {
        if self.is_incoming(target) {
            self.from.to_lowercase()
        } else {
            self.to.to_lowercase()
        }
    }

    /// Carries more than a bare selector
    pub fn has_call_data(&self) -> bool {
        self.input_data != "0x" && self.input_data.len() > 10
    }
}

/// An ERC-20 transfer touching the target wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Raw token amount (token decimals not applied)
    pub value: String,
    pub token_name: String,
    pub token_symbol: String,
    pub contract_address: String,
    pub timestamp: u64,
}

// ============================================
// EVIDENCE GRAPH
// ============================================

/// Node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Target,
    Wallet,
    Exchange,
    Mixer,
    Contract,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Target => "target",
            NodeKind::Wallet => "wallet",
            NodeKind::Exchange => "exchange",
            NodeKind::Mixer => "mixer",
            NodeKind::Contract => "contract",
        }
    }
}

/// Risk level attached to nodes and edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Summary metadata attached to a node after the scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    pub tx_count: usize,
    pub eth_volume: f64,
    pub connection_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Lowercase address
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<NodeMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Always the target address
    pub source: String,
    /// Counterparty address
    pub target: String,
    pub tx_count: usize,
    pub total_value_eth: f64,
    pub risk: RiskLevel,
}

/// Star graph centred on the target wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl EvidenceGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }
}

/// Running per-counterparty totals, keyed by lowercase address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartyAggregate {
    pub address: String,
    pub tx_count: usize,
    pub total_value_eth: f64,
}

// ============================================
// PATTERNS & INDICATORS
// ============================================

/// Independent boolean flags; once raised they stay raised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskIndicators {
    pub mixer_usage: bool,
    pub new_wallet_pattern: bool,
    pub high_volume_spike: bool,
    pub cex_interaction: bool,
    pub exploit_contract_interaction: bool,
}

impl RiskIndicators {
    /// Flags raised on either side stay raised
    pub fn merge(&mut self, other: RiskIndicators) {
        self.mixer_usage |= other.mixer_usage;
        self.new_wallet_pattern |= other.new_wallet_pattern;
        self.high_volume_spike |= other.high_volume_spike;
        self.cex_interaction |= other.cex_interaction;
        self.exploit_contract_interaction |= other.exploit_contract_interaction;
    }
}

/// Typed heuristic identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    VanityAddress,
    NewWalletBurst,
    HighVolumeSpike,
    DustAttack,
    RapidDrain,
    Honeypot,
    MixerInteraction,
}

/// Weight pair shared by the prosecution and defense stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternWeights {
    /// Severity added by the prosecution
    pub prosecution: i32,
    /// Plausibility added by the defense for its benign reading
    pub defense_offset: i32,
}

impl PatternKind {
    pub const ALL: [PatternKind; 7] = [
        PatternKind::VanityAddress,
        PatternKind::NewWalletBurst,
        PatternKind::HighVolumeSpike,
        PatternKind::DustAttack,
        PatternKind::RapidDrain,
        PatternKind::Honeypot,
        PatternKind::MixerInteraction,
    ];

    /// Greppable label embedded in every description of this kind
    pub fn marker(&self) -> &'static str {
        match self {
            PatternKind::VanityAddress => "VANITY ADDRESS",
            PatternKind::NewWalletBurst => "NEW WALLET BURST",
            PatternKind::HighVolumeSpike => "HIGH VOLUME SPIKE",
            PatternKind::DustAttack => "DUST ATTACK",
            PatternKind::RapidDrain => "RAPID DRAIN",
            PatternKind::Honeypot => "HONEYPOT",
            PatternKind::MixerInteraction => "MIXER INTERACTION",
        }
    }

    /// Scoring table. Mixer contact is weighted through the indicator flag,
    /// so its pattern entry carries no weight of its own.
    pub const fn weights(&self) -> PatternWeights {
        let (prosecution, defense_offset) = match self {
            PatternKind::VanityAddress => (25, 10),
            PatternKind::RapidDrain => (30, 15),
            PatternKind::Honeypot => (35, 10),
            PatternKind::DustAttack => (20, 15),
            PatternKind::NewWalletBurst => (25, 10),
            PatternKind::HighVolumeSpike => (20, 10),
            PatternKind::MixerInteraction => (0, 0),
        };
        PatternWeights {
            prosecution,
            defense_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub kind: PatternKind,
    pub description: String,
}

impl DetectedPattern {
    /// Builds `"<MARKER>: <detail>"`
    pub fn new(kind: PatternKind, detail: impl AsRef<str>) -> Self {
        Self {
            kind,
            description: format!("{}: {}", kind.marker(), detail.as_ref()),
        }
    }
}

// ============================================
// REPUTATION
// ============================================

/// One source's finding about an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationReport {
    pub source: String,
    pub is_scam: bool,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebReputation {
    pub scam_reports: usize,
    pub summary: String,
    pub reports: Vec<ReputationReport>,
}

// ============================================
// EVIDENCE
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub wallet_age_days: u64,
    pub average_tx_value: f64,
    pub net_flow: f64,
    pub transaction_frequency: f64,
    pub largest_transaction: f64,
    pub smallest_transaction: f64,
}

/// Final categorical outcome, also used for the evidence-stage conclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Likely Fraud")]
    LikelyFraud,
    #[serde(rename = "Likely Clean")]
    LikelyClean,
    #[serde(rename = "Inconclusive")]
    Inconclusive,
}

/// Scores at or above this are fraud
pub const FRAUD_THRESHOLD: f64 = 70.0;
/// Scores at or below this are clean
pub const CLEAN_THRESHOLD: f64 = 40.0;

impl Verdict {
    /// Total mapping of a [0,100] score onto the three verdicts
    pub fn from_score(score: f64) -> Self {
        if score >= FRAUD_THRESHOLD {
            Verdict::LikelyFraud
        } else if score <= CLEAN_THRESHOLD {
            Verdict::LikelyClean
        } else {
            Verdict::Inconclusive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::LikelyFraud => "Likely Fraud",
            Verdict::LikelyClean => "Likely Clean",
            Verdict::Inconclusive => "Inconclusive",
        }
    }

    pub fn as_upper(&self) -> &'static str {
        match self {
            Verdict::LikelyFraud => "LIKELY FRAUD",
            Verdict::LikelyClean => "LIKELY CLEAN",
            Verdict::Inconclusive => "INCONCLUSIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceConclusion {
    pub verdict: Verdict,
    pub risk_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSummary {
    pub wallet: String,
    pub chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    pub total_in: f64,
    pub total_out: f64,
    pub net_flow: f64,
    pub balance_eth: f64,
    pub tx_count: usize,
    pub token_transfer_count: usize,
    pub unique_counterparties: usize,
    pub high_risk_patterns: Vec<DetectedPattern>,
    pub graph: EvidenceGraph,
    pub risk_indicators: RiskIndicators,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_reputation: Option<WebReputation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<DetailedAnalysis>,
    /// Pre-assessed estimate, the judge seeds from it when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<EvidenceConclusion>,
}

impl EvidenceSummary {
    pub fn has_pattern(&self, kind: PatternKind) -> bool {
        self.high_risk_patterns.iter().any(|p| p.kind == kind)
    }

    /// Scam-report count, zero without reputation data
    pub fn scam_reports(&self) -> usize {
        self.web_reputation.as_ref().map(|r| r.scam_reports).unwrap_or(0)
    }
}

// ============================================
// ADVERSARIAL STAGES
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsecutionCase {
    pub key_points: Vec<String>,
    pub narrative: String,
    pub highlighted_node_ids: Vec<String>,
    pub severity_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseCase {
    pub key_points: Vec<String>,
    pub narrative: String,
    pub mitigating_factors: Vec<String>,
    pub plausibility_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeVerdict {
    pub verdict: Verdict,
    /// Clamped into [0,100]; fractional because of the blend weights
    pub risk_score: f64,
    pub reasoning: String,
    pub recommendations: Vec<String>,
}

/// The full document handed to UI and alerting consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtCase {
    pub case_id: Uuid,
    pub wallet: String,
    pub chain: String,
    pub timestamp: DateTime<Utc>,
    pub evidence: EvidenceSummary,
    pub prosecution: ProsecutionCase,
    pub defense: DefenseCase,
    pub verdict: JudgeVerdict,
}

impl CourtCase {
    pub fn alert(&self) -> AlertNotification {
        AlertNotification::from_verdict(&self.wallet, &self.verdict)
    }
}

// ============================================
// ALERTING
// ============================================

/// Short-form outbound notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotification {
    pub wallet_address_short: String,
    pub verdict_upper: String,
    pub risk_score_percent: u8,
}

impl AlertNotification {
    pub fn from_verdict(wallet: &str, verdict: &JudgeVerdict) -> Self {
        Self {
            wallet_address_short: short_address(wallet),
            verdict_upper: verdict.verdict.as_upper().to_string(),
            risk_score_percent: verdict.risk_score.clamp(0.0, 100.0).round() as u8,
        }
    }

    /// Plain-text message body
    pub fn render(&self) -> String {
        format!(
            "🔔 SHERLOCK ALERT\n\nWallet: {}\nVerdict: {}\nRisk Score: {}%",
            self.wallet_address_short, self.verdict_upper, self.risk_score_percent
        )
    }
}
