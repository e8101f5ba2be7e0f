//! Prosecution Stage
//!
//! Argues the fraud reading of the evidence. Severity starts at 0 and only
//! grows:
//! - each detected pattern adds its prosecution weight
//! - mixer usage +25, any scam report +40
//! - |net flow| > 50 ETH +15, more than 10 transactions/day +15
//!
//! The final severity is clamped to [0,100].

use tracing::info;

use crate::models::types::{EvidenceSummary, NodeKind, PatternKind, ProsecutionCase};

pub const MIXER_SEVERITY: i32 = 25;
pub const SCAM_REPORT_SEVERITY: i32 = 40;
pub const NET_FLOW_SEVERITY: i32 = 15;
pub const FREQUENCY_SEVERITY: i32 = 15;

pub const NET_FLOW_THRESHOLD_ETH: f64 = 50.0;
pub const FREQUENCY_THRESHOLD_PER_DAY: f64 = 10.0;

/// Key point argued for a detected pattern, if the prosecution uses it
fn pattern_key_point(kind: PatternKind, evidence: &EvidenceSummary) -> Option<String> {
    let point = match kind {
        PatternKind::VanityAddress => "VANITY ADDRESS DECEPTION: The wallet uses a suspicious vanity address pattern, commonly employed by scammers to impersonate legitimate contracts and deceive victims.".to_string(),
        PatternKind::RapidDrain => "RAPID FUND DRAINAGE: Evidence shows funds being moved within minutes of receipt - a hallmark of phishing operations and wallet drainer exploits.".to_string(),
        PatternKind::Honeypot => "HONEYPOT ACCUMULATION: Wallet only receives funds without any outgoing transactions, consistent with scam accumulation addresses.".to_string(),
        PatternKind::DustAttack => "DUST ATTACK PATTERN: Multiple tiny transactions detected, used for wallet tracking and potential airdrop scam setups.".to_string(),
        PatternKind::NewWalletBurst => "SUSPICIOUS BURST ACTIVITY: High transaction volume immediately after wallet creation indicates automated bot operations typical of pump-and-dump schemes.".to_string(),
        PatternKind::HighVolumeSpike => format!(
            "EXTREME VOLUME MOVEMENT: {:.4} ETH received, {:.4} ETH sent - volume patterns consistent with money laundering operations.",
            evidence.total_in, evidence.total_out
        ),
        // argued through the mixer indicator instead
        PatternKind::MixerInteraction => return None,
    };
    Some(point)
}

pub struct Prosecutor;

impl Prosecutor {
    pub fn build_case(evidence: &EvidenceSummary) -> ProsecutionCase {
        let mut key_points = Vec::new();
        let mut highlighted = Vec::new();
        let mut severity: i32 = 0;

        for pattern in &evidence.high_risk_patterns {
            if let Some(point) = pattern_key_point(pattern.kind, evidence) {
                key_points.push(point);
                severity += pattern.kind.weights().prosecution;
                if pattern.kind == PatternKind::VanityAddress {
                    highlighted.push(evidence.wallet.to_lowercase());
                }
            }
        }

        if evidence.risk_indicators.mixer_usage {
            key_points.push("MIXER CONCEALMENT: Wallet has interacted with known cryptocurrency mixers, demonstrating intent to obscure fund origins and destinations.".to_string());
            highlighted.extend(
                evidence
                    .graph
                    .nodes_of_kind(NodeKind::Mixer)
                    .map(|n| n.id.clone()),
            );
            severity += MIXER_SEVERITY;
        }

        let reports = evidence.scam_reports();
        if reports > 0 {
            key_points.push(format!(
                "COMMUNITY-VERIFIED FRAUD: {} independent scam report(s) filed against this wallet in public databases. This represents verified incidents of fraudulent activity.",
                reports
            ));
            severity += SCAM_REPORT_SEVERITY;
        }

        if let Some(analysis) = &evidence.detailed_analysis {
            if analysis.net_flow.abs() > NET_FLOW_THRESHOLD_ETH {
                key_points.push(format!(
                    "SIGNIFICANT FUND FLOW: Net flow of {:.2} ETH indicates substantial financial operations through this address.",
                    analysis.net_flow
                ));
                severity += NET_FLOW_SEVERITY;
            }
            if analysis.transaction_frequency > FREQUENCY_THRESHOLD_PER_DAY {
                key_points.push(format!(
                    "AUTOMATED OPERATIONS: {:.1} transactions per day suggests bot-driven activity rather than organic human usage.",
                    analysis.transaction_frequency
                ));
                severity += FREQUENCY_SEVERITY;
            }
        }

        let severity_score = severity.clamp(0, 100) as u8;
        let narrative = narrative(evidence, &key_points, severity_score);

        info!(
            "⚖️ Prosecution: severity {}/100 from {} key point(s)",
            severity_score,
            key_points.len()
        );

        ProsecutionCase {
            key_points,
            narrative,
            highlighted_node_ids: highlighted,
            severity_score,
        }
    }
}

fn narrative(evidence: &EvidenceSummary, key_points: &[String], severity: u8) -> String {
    let mut text = String::from("THE PROSECUTION'S CASE:\n\n");
    text.push_str(&format!(
        "The evidence against wallet {} is compelling and multifaceted. ",
        evidence.wallet
    ));

    if key_points.is_empty() {
        text.push_str("While direct high-risk patterns are limited, the cumulative behavioral profile warrants scrutiny. ");
        text.push_str("The lack of obvious red flags does not eliminate the possibility of sophisticated concealment tactics. ");
    } else {
        text.push_str(&format!(
            "This investigation has uncovered {} distinct indicators of fraudulent intent:\n\n",
            key_points.len()
        ));
        for (i, point) in key_points.iter().enumerate() {
            text.push_str(&format!("{}. {}\n\n", i + 1, point));
        }
    }

    if let Some(analysis) = &evidence.detailed_analysis {
        if analysis.wallet_age_days < 30 {
            text.push_str("TEMPORAL ANALYSIS: ");
            text.push_str(&format!(
                "This wallet has been active for only {} days. ",
                analysis.wallet_age_days
            ));
            text.push_str("The brief operational window combined with suspicious activity patterns suggests a deliberate, time-limited fraudulent operation. ");
            text.push_str("Scammers often create wallets for specific campaigns and abandon them after achieving their objectives.\n\n");
        }
    }

    if let Some(reputation) = evidence.web_reputation.as_ref().filter(|r| r.scam_reports > 0) {
        text.push_str("COMMUNITY INTELLIGENCE: ");
        text.push_str(&reputation.summary);
        text.push_str("\n\nThese reports represent real victims and verified incidents. The prosecution emphasizes that community reports are not speculative - they document actual harm inflicted by this wallet.\n\n");
    }

    text.push_str("CONCLUSION OF PROSECUTION:\n\n");
    if severity >= 70 {
        text.push_str(&format!("With a severity score of {}/100, the evidence overwhelmingly demonstrates fraudulent intent and malicious activity. ", severity));
        text.push_str("The prosecution recommends classifying this wallet as HIGH RISK and advises complete avoidance. ");
        text.push_str("Any interaction with this address poses significant financial danger to users.");
    } else if severity >= 40 {
        text.push_str(&format!("The severity score of {}/100 indicates substantial suspicious behavior warranting serious concern. ", severity));
        text.push_str("While some patterns may have alternative explanations, the cumulative evidence points toward likely fraudulent operations. ");
        text.push_str("The prosecution urges extreme caution when considering any interaction with this wallet.");
    } else {
        text.push_str(&format!("With a severity score of {}/100, the prosecution acknowledges limited direct evidence of fraud. ", severity));
        text.push_str("However, the absence of strong indicators does not guarantee legitimacy. ");
        text.push_str("The prosecution recommends maintaining standard security precautions and continued monitoring.");
    }

    text
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::types::{
        DetailedAnalysis, DetectedPattern, EvidenceGraph, GraphNode, RiskIndicators, RiskLevel,
        WebReputation,
    };

    pub(crate) fn evidence() -> EvidenceSummary {
        EvidenceSummary {
            wallet: "0xAbC0000000000000000000000000000000000001".to_string(),
            chain: "Ethereum Mainnet".to_string(),
            first_seen: None,
            last_seen: None,
            total_in: 0.0,
            total_out: 0.0,
            net_flow: 0.0,
            balance_eth: 0.0,
            tx_count: 0,
            token_transfer_count: 0,
            unique_counterparties: 0,
            high_risk_patterns: vec![],
            graph: EvidenceGraph::default(),
            risk_indicators: RiskIndicators::default(),
            web_reputation: None,
            detailed_analysis: Some(DetailedAnalysis::default()),
            conclusion: None,
        }
    }

    pub(crate) fn reputation(scam_reports: usize) -> WebReputation {
        WebReputation {
            scam_reports,
            summary: "🚨 SCAM ALERTS FOUND (1 source(s)):\n\n• Etherscan Labels: Flagged as: Scam\n".to_string(),
            reports: vec![],
        }
    }

    #[test]
    fn test_no_evidence_means_zero_severity() {
        let case = Prosecutor::build_case(&evidence());
        assert_eq!(case.severity_score, 0);
        assert!(case.key_points.is_empty());
        assert!(case.narrative.contains("limited direct evidence"));
    }

    #[test]
    fn test_pattern_weights_accumulate() {
        let mut ev = evidence();
        ev.high_risk_patterns = vec![
            DetectedPattern::new(PatternKind::VanityAddress, "x"),
            DetectedPattern::new(PatternKind::DustAttack, "x"),
        ];
        let case = Prosecutor::build_case(&ev);
        assert_eq!(case.severity_score, 45);
        assert_eq!(case.key_points.len(), 2);
        assert_eq!(case.highlighted_node_ids, vec![ev.wallet.to_lowercase()]);
    }

    #[test]
    fn test_honeypot_mixer_and_report_cap_at_100() {
        let mixer = "0x910cbd523d972eb0a6f4cae4618ad62622b39dbf";
        let mut ev = evidence();
        ev.high_risk_patterns = vec![
            DetectedPattern::new(PatternKind::MixerInteraction, mixer),
            DetectedPattern::new(PatternKind::Honeypot, "x"),
        ];
        ev.risk_indicators.mixer_usage = true;
        ev.web_reputation = Some(reputation(1));
        ev.graph.nodes.push(GraphNode {
            id: mixer.to_string(),
            kind: NodeKind::Mixer,
            label: "MIXER 0x910cbd...".to_string(),
            risk_level: RiskLevel::High,
            metrics: None,
        });

        let case = Prosecutor::build_case(&ev);
        assert_eq!(case.severity_score, 100);
        assert!(case.highlighted_node_ids.contains(&mixer.to_string()));
        assert!(case.key_points.iter().any(|p| p.starts_with("MIXER CONCEALMENT")));
        assert!(case.key_points.iter().any(|p| p.starts_with("COMMUNITY-VERIFIED FRAUD: 1 ")));
        assert!(case.narrative.contains("COMMUNITY INTELLIGENCE"));
        assert!(case.narrative.contains("severity score of 100/100"));
    }

    #[test]
    fn test_flow_and_frequency_terms() {
        let mut ev = evidence();
        ev.detailed_analysis = Some(DetailedAnalysis {
            wallet_age_days: 400,
            net_flow: -75.0,
            transaction_frequency: 12.5,
            ..Default::default()
        });
        let case = Prosecutor::build_case(&ev);
        assert_eq!(case.severity_score, 30);
        assert!(case.key_points[0].contains("-75.00 ETH"));
        assert!(case.key_points[1].contains("12.5 transactions per day"));
        assert!(!case.narrative.contains("TEMPORAL ANALYSIS"));
    }
}
