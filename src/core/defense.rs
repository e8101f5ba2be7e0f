//! Defense Stage
//!
//! Argues the benign reading. Plausibility starts neutral at 50, gains a
//! smaller offset for every pattern the prosecution used, and reacts to
//! mixer/exchange contact, reputation, wallet age, flow balance and the
//! prosecution's own severity. Clamped to [0,100].

use tracing::info;

use crate::models::types::{DefenseCase, EvidenceSummary, PatternKind, ProsecutionCase};

pub const NEUTRAL_PLAUSIBILITY: i32 = 50;

const MIXER_PRESENT_BONUS: i32 = 5;
const MIXER_ABSENT_BONUS: i32 = 15;
const CEX_BONUS: i32 = 20;
const SCAM_REPORT_PENALTY: i32 = 10;
const CLEAN_REPUTATION_BONUS: i32 = 25;
const ESTABLISHED_WALLET_BONUS: i32 = 20;
const SUSTAINED_WALLET_BONUS: i32 = 10;
const BALANCED_FLOW_BONUS: i32 = 15;
const WEAK_PROSECUTION_BONUS: i32 = 20;
const AMBIGUOUS_PROSECUTION_BONUS: i32 = 10;

/// Counter-argument and mitigating factor for a detected pattern
fn pattern_rebuttal(kind: PatternKind) -> Option<(&'static str, &'static str)> {
    match kind {
        PatternKind::VanityAddress => Some((
            "LEGITIMATE BRANDING: Vanity addresses are commonly used by legitimate projects for brand recognition and user trust. Many reputable DeFi protocols use vanity addresses.",
            "Vanity address could indicate professional project branding",
        )),
        PatternKind::RapidDrain => Some((
            "AUTOMATED TRADING: Rapid fund movements are characteristic of trading bots, arbitrage operations, and DeFi protocols. Speed does not imply malicious intent.",
            "Fast transactions consistent with automated trading systems",
        )),
        PatternKind::Honeypot => Some((
            "ACCUMULATION WALLET: One-way fund flows are normal for treasury wallets, cold storage, and long-term holding strategies. Not all accumulation is malicious.",
            "Receive-only pattern matches cold storage behavior",
        )),
        PatternKind::DustAttack => Some((
            "AIRDROP DISTRIBUTION: Small transactions could be legitimate airdrops, token distributions, or gas refunds. The wallet may be a recipient, not initiator.",
            "Dust transactions may be received airdrops, not attacks",
        )),
        PatternKind::NewWalletBurst => Some((
            "TOKEN LAUNCH ACTIVITY: High volume from new wallets is expected during token launches, NFT mints, and DeFi protocol deployments. This is standard blockchain behavior.",
            "Burst activity consistent with legitimate launch events",
        )),
        PatternKind::HighVolumeSpike => Some((
            "EXCHANGE OR WHALE ACTIVITY: Large transaction volumes are normal for exchanges, market makers, and institutional investors. Volume alone is not evidence of fraud.",
            "High volume matches exchange or institutional operations",
        )),
        PatternKind::MixerInteraction => None,
    }
}

pub struct Defender;

impl Defender {
    pub fn build_defense(evidence: &EvidenceSummary, prosecution: &ProsecutionCase) -> DefenseCase {
        let mut key_points: Vec<String> = Vec::new();
        let mut mitigating: Vec<String> = Vec::new();
        let mut plausibility = NEUTRAL_PLAUSIBILITY;

        for pattern in &evidence.high_risk_patterns {
            if let Some((point, factor)) = pattern_rebuttal(pattern.kind) {
                key_points.push(point.to_string());
                mitigating.push(factor.to_string());
                plausibility += pattern.kind.weights().defense_offset;
            }
        }

        if evidence.risk_indicators.mixer_usage {
            key_points.push("PRIVACY PROTECTION: Mixer usage is a legitimate privacy tool used by individuals concerned about surveillance. Privacy is not a crime. Many law-abiding users protect their financial privacy.".to_string());
            mitigating.push("Mixer usage indicates privacy awareness, not necessarily criminal intent".to_string());
            plausibility += MIXER_PRESENT_BONUS;
        } else {
            mitigating.push("No mixer usage detected - transparent operations".to_string());
            plausibility += MIXER_ABSENT_BONUS;
        }

        if evidence.risk_indicators.cex_interaction {
            key_points.push("EXCHANGE VERIFICATION: Interaction with centralized exchanges suggests KYC compliance and legitimate operations. Scammers typically avoid KYC-required platforms.".to_string());
            mitigating.push("CEX interaction indicates potential KYC verification".to_string());
            plausibility += CEX_BONUS;
        }

        let reports = evidence.scam_reports();
        if reports > 0 {
            key_points.push(format!(
                "UNVERIFIED REPORTS: The {} scam report(s) are from public databases where anyone can submit claims without verification. These could be false reports from competitors, mistakes, or misunderstandings.",
                reports
            ));
            mitigating.push("Scam reports are unverified and may be false positives".to_string());
            plausibility -= SCAM_REPORT_PENALTY;
        } else {
            key_points.push("CLEAN REPUTATION: No scam reports found in public databases. This wallet has not been flagged by the community.".to_string());
            mitigating.push("Zero scam reports in public databases".to_string());
            plausibility += CLEAN_REPUTATION_BONUS;
        }

        if let Some(analysis) = &evidence.detailed_analysis {
            let age = analysis.wallet_age_days;
            if age > 180 {
                key_points.push(format!(
                    "ESTABLISHED WALLET: This wallet has been active for {} days (over 6 months). Scam wallets are typically short-lived. Longevity suggests legitimate operations.",
                    age
                ));
                mitigating.push("Long operational history reduces fraud likelihood".to_string());
                plausibility += ESTABLISHED_WALLET_BONUS;
            } else if age > 30 {
                mitigating.push("Wallet has sustained activity beyond typical scam timeframe".to_string());
                plausibility += SUSTAINED_WALLET_BONUS;
            }

            if analysis.net_flow.abs() < 10.0 {
                key_points.push("BALANCED OPERATIONS: Net flow is relatively balanced, suggesting ongoing operations rather than one-time scam extraction.".to_string());
                mitigating.push("Balanced net flow indicates sustainable operations".to_string());
                plausibility += BALANCED_FLOW_BONUS;
            }
        }

        let severity = prosecution.severity_score;
        if severity < 40 {
            key_points.push(format!(
                "WEAK PROSECUTION CASE: The Prosecutor's severity score of {}/100 indicates limited evidence of fraud. The defense maintains this wallet is likely legitimate.",
                severity
            ));
            plausibility += WEAK_PROSECUTION_BONUS;
        } else if severity < 70 {
            key_points.push(format!(
                "AMBIGUOUS EVIDENCE: The Prosecutor's severity score of {}/100 shows the evidence is not conclusive. Ambiguity should favor the presumption of innocence.",
                severity
            ));
            plausibility += AMBIGUOUS_PROSECUTION_BONUS;
        }

        let plausibility_score = plausibility.clamp(0, 100) as u8;
        let narrative = narrative(evidence, prosecution, &key_points, &mitigating, plausibility_score);

        info!(
            "🛡️ Defense: plausibility {}/100 ({} mitigating factor(s))",
            plausibility_score,
            mitigating.len()
        );

        DefenseCase {
            key_points,
            narrative,
            mitigating_factors: mitigating,
            plausibility_score,
        }
    }
}

fn narrative(
    evidence: &EvidenceSummary,
    prosecution: &ProsecutionCase,
    key_points: &[String],
    mitigating: &[String],
    plausibility: u8,
) -> String {
    let mut text = String::from("THE DEFENSE'S CASE:\n\n");
    text.push_str(&format!(
        "The defense challenges the Prosecutor's characterization of wallet {}. ",
        evidence.wallet
    ));

    if prosecution.severity_score >= 70 {
        text.push_str("While the Prosecutor has presented concerning patterns, the defense will demonstrate that alternative explanations exist for this behavior.\n\n");
    } else {
        text.push_str(&format!(
            "The Prosecutor's case, with a severity score of only {}/100, fails to meet the threshold for fraud determination. The defense will show this wallet is likely legitimate.\n\n",
            prosecution.severity_score
        ));
    }

    if !key_points.is_empty() {
        text.push_str("COUNTER-ARGUMENTS:\n\n");
        for (i, point) in key_points.iter().enumerate() {
            text.push_str(&format!("{}. {}\n\n", i + 1, point));
        }
    }

    if !mitigating.is_empty() {
        text.push_str("MITIGATING FACTORS:\n\n");
        text.push_str("The defense identifies the following factors that support legitimate use:\n");
        for factor in mitigating {
            text.push_str(&format!("• {}\n", factor));
        }
        text.push('\n');
    }

    text.push_str("PRESUMPTION OF INNOCENCE:\n\n");
    text.push_str("Blockchain forensics must adhere to the principle that suspicious patterns are not proof of fraud. ");
    text.push_str("The burden of proof lies with the Prosecutor to demonstrate malicious intent beyond reasonable doubt. ");
    text.push_str("Ambiguous evidence should not be weaponized against users who value privacy or employ common DeFi strategies.\n\n");

    text.push_str("CONCLUSION OF DEFENSE:\n\n");
    if plausibility >= 70 {
        text.push_str(&format!("With a plausibility score of {}/100, the defense has demonstrated strong likelihood of legitimate operations. ", plausibility));
        text.push_str("The patterns identified by the Prosecutor have innocent explanations. ");
        text.push_str("The defense requests that this wallet be classified as LOW RISK and treated with the presumption of innocence.");
    } else if plausibility >= 40 {
        text.push_str(&format!("The plausibility score of {}/100 indicates reasonable doubt regarding the Prosecutor's fraud claims. ", plausibility));
        text.push_str("While some patterns warrant caution, they do not constitute proof of malicious activity. ");
        text.push_str("The defense recommends a MODERATE RISK classification pending further evidence.");
    } else {
        text.push_str(&format!("The defense acknowledges the plausibility score of {}/100 suggests limited legitimate explanations. ", plausibility));
        text.push_str("However, the defense maintains that even suspicious patterns deserve fair evaluation. ");
        text.push_str("Users should exercise caution but avoid premature conclusions without definitive proof of fraud.");
    }

    text
}
