//! Judge Stage
//!
//! Blends the evidence estimate with both arguments:
//!
//! ```text
//! seed   = evidence conclusion score, or 50 without one
//! seed  += min(scam_reports * 20, 40)
//! score  = 0.4 * seed + 0.6 * severity
//! score -= (plausibility - 50) * 0.2   only if plausibility > 50 and severity < 60
//! score += 8 per detected pattern
//! score += 15 on mixer usage
//! score -= 5  on exchange contact while severity < 50
//! ```
//!
//! The defense can discount a weak prosecution, never override a strong one.

use tracing::info;

use crate::models::types::{
    DefenseCase, EvidenceSummary, JudgeVerdict, ProsecutionCase, Verdict,
};

pub const DEFAULT_SEED: f64 = 50.0;
pub const SEED_WEIGHT: f64 = 0.4;
pub const PROSECUTION_WEIGHT: f64 = 0.6;
pub const DEFENSE_WEIGHT: f64 = 0.2;
pub const DEFENSE_SEVERITY_CEILING: u8 = 60;
pub const REPORT_BONUS: f64 = 20.0;
pub const REPORT_BONUS_CAP: f64 = 40.0;
pub const PATTERN_BONUS: f64 = 8.0;
pub const MIXER_BONUS: f64 = 15.0;
pub const CEX_DISCOUNT: f64 = 5.0;
pub const CEX_SEVERITY_CEILING: u8 = 50;

pub struct Judge;

impl Judge {
    pub fn render_verdict(
        evidence: &EvidenceSummary,
        prosecution: &ProsecutionCase,
        defense: &DefenseCase,
    ) -> JudgeVerdict {
        let risk_score = Self::score(evidence, prosecution, defense);
        let verdict = Verdict::from_score(risk_score);

        info!(
            "🔨 Judge: {} at {:.1}/100 (severity {}, plausibility {})",
            verdict.as_str(),
            risk_score,
            prosecution.severity_score,
            defense.plausibility_score
        );

        JudgeVerdict {
            verdict,
            risk_score,
            reasoning: reasoning(evidence, prosecution, defense, risk_score, verdict),
            recommendations: recommendations(evidence, verdict, risk_score),
        }
    }

    /// Final risk score, clamped to [0,100]
    pub fn score(
        evidence: &EvidenceSummary,
        prosecution: &ProsecutionCase,
        defense: &DefenseCase,
    ) -> f64 {
        let severity = f64::from(prosecution.severity_score);
        let plausibility = f64::from(defense.plausibility_score);

        let mut seed = evidence
            .conclusion
            .map(|c| f64::from(c.risk_score))
            .unwrap_or(DEFAULT_SEED);

        let reports = evidence.scam_reports();
        if reports > 0 {
            seed += (reports as f64 * REPORT_BONUS).min(REPORT_BONUS_CAP);
        }

        let mut score = SEED_WEIGHT * seed + PROSECUTION_WEIGHT * severity;

        if defense.plausibility_score > 50 && prosecution.severity_score < DEFENSE_SEVERITY_CEILING {
            score -= (plausibility - 50.0) * DEFENSE_WEIGHT;
        }

        score += evidence.high_risk_patterns.len() as f64 * PATTERN_BONUS;

        if evidence.risk_indicators.mixer_usage {
            score += MIXER_BONUS;
        }
        if evidence.risk_indicators.cex_interaction && prosecution.severity_score < CEX_SEVERITY_CEILING {
            score -= CEX_DISCOUNT;
        }

        score.clamp(0.0, 100.0)
    }
}

fn reasoning(
    evidence: &EvidenceSummary,
    prosecution: &ProsecutionCase,
    defense: &DefenseCase,
    risk_score: f64,
    verdict: Verdict,
) -> String {
    let severity = prosecution.severity_score;
    let plausibility = defense.plausibility_score;
    let reports = evidence.scam_reports();
    let indicators = &evidence.risk_indicators;

    let mut text = String::from("COURT'S VERDICT AND REASONING:\n\n");
    text.push_str(&format!(
        "After careful review of the evidence, prosecution arguments, and defense counter-arguments, this Court renders a verdict of \"{}\" with a final risk score of {:.1}/100.\n\n",
        verdict.as_upper(),
        risk_score
    ));

    text.push_str("PROSECUTION'S CASE EVALUATION:\n\n");
    text.push_str(&format!("The Prosecutor presented a severity score of {}/100. ", severity));
    text.push_str(match severity {
        80.. => "The Court finds the prosecution's evidence OVERWHELMING, with multiple verified indicators of fraudulent activity. ",
        70..=79 => "The Court finds the prosecution's evidence compelling, with multiple corroborating red flags that create a strong case for fraudulent activity. ",
        40..=69 => "The Court acknowledges the prosecution has raised legitimate concerns, though the evidence is not overwhelming. ",
        _ => "The Court finds the prosecution's case weak, with insufficient evidence to support fraud allegations. ",
    });
    if !prosecution.key_points.is_empty() {
        text.push_str(&format!(
            "The prosecution identified {} key risk indicators. ",
            prosecution.key_points.len()
        ));
    }
    text.push_str("\n\n");

    text.push_str("DEFENSE'S CASE EVALUATION:\n\n");
    text.push_str(&format!(
        "The Defense presented a plausibility score of {}/100 for legitimate use. ",
        plausibility
    ));
    if severity >= 80 && reports > 0 {
        text.push_str("However, the Court finds the defense's arguments INSUFFICIENT to overcome the weight of verified scam reports and Etherscan flagging. Alternative explanations are implausible when confronted with community-verified fraud incidents. ");
    } else if plausibility >= 70 {
        text.push_str("The Court finds the defense's alternative explanations credible and well-supported by evidence of legitimate blockchain activity patterns. ");
    } else if plausibility >= 40 {
        text.push_str("The Court acknowledges the defense has provided some reasonable alternative explanations, creating doubt about the prosecution's claims. ");
    } else {
        text.push_str("The Court finds the defense's alternative explanations unconvincing given the weight of suspicious patterns. ");
    }
    if !defense.mitigating_factors.is_empty() {
        text.push_str(&format!(
            "The defense identified {} mitigating factors. ",
            defense.mitigating_factors.len()
        ));
    }
    text.push_str("\n\n");

    text.push_str("CRITICAL EVIDENCE ANALYSIS:\n\n");
    match evidence.web_reputation.as_ref().filter(|r| r.scam_reports > 0) {
        Some(reputation) => {
            text.push_str(&format!(
                "🚨 ETHERSCAN FLAGGING: {} verified scam report(s) found. ",
                reputation.scam_reports
            ));
            if reputation.summary.contains("Etherscan") {
                text.push_str("ETHERSCAN HAS OFFICIALLY FLAGGED THIS WALLET. This is authoritative evidence from a trusted blockchain explorer, not mere speculation. ");
            }
            if reputation.scam_reports >= 2 {
                text.push_str("Multiple independent sources confirm fraudulent activity. ");
            }
            text.push_str("The Court gives MAXIMUM weight to official Etherscan flagging and verified scam databases. ");
        }
        None => {
            text.push_str("Web Reputation: No scam reports found in public databases, which supports legitimacy. ");
        }
    }
    if indicators.mixer_usage {
        text.push_str("Mixer usage was detected - a serious indicator of fund obfuscation. ");
    }
    if indicators.cex_interaction && severity < 60 {
        text.push_str("CEX interaction suggests potential KYC compliance. ");
    }
    let patterns = &evidence.high_risk_patterns;
    if !patterns.is_empty() {
        let shown: Vec<&str> = patterns.iter().take(2).map(|p| p.description.as_str()).collect();
        text.push_str(&format!(
            "{} HIGH-RISK PATTERN(S) DETECTED: {}{}. ",
            patterns.len(),
            shown.join(", "),
            if patterns.len() > 2 { ", and more" } else { "" }
        ));
    }
    text.push_str("\n\n");

    text.push_str("COURT'S DETERMINATION:\n\n");
    match verdict {
        Verdict::LikelyFraud => {
            text.push_str("The preponderance of evidence OVERWHELMINGLY supports the prosecution's case. ");
            if reports > 0 {
                text.push_str("ETHERSCAN FLAGGING and verified scam reports constitute authoritative proof of fraudulent activity. ");
            }
            text.push_str("The combination of official warnings, high-risk behavioral patterns, and prosecution evidence leaves no reasonable doubt. ");
            text.push_str("The defense's alternative explanations are REJECTED as implausible when confronted with verified fraud indicators. ");
            text.push_str("This Court classifies this wallet as EXTREMELY HIGH RISK and recommends COMPLETE AVOIDANCE.");
        }
        Verdict::LikelyClean => {
            text.push_str("The defense has successfully challenged the prosecution's claims. The evidence shows ");
            if indicators.cex_interaction {
                text.push_str("legitimate exchange interactions, ");
            }
            text.push_str("patterns consistent with normal blockchain operations, and insufficient corroboration of fraud allegations. ");
            text.push_str("The Court finds this wallet likely operates legitimately, though users should maintain standard security practices.");
        }
        Verdict::Inconclusive => {
            text.push_str("The evidence is genuinely ambiguous. Both the prosecution and defense have presented reasonable arguments. ");
            text.push_str(&format!(
                "With a risk score of {:.1}/100, this case falls in the uncertain zone where patterns could indicate either sophisticated fraud or legitimate complex operations. ",
                risk_score
            ));
            text.push_str("The Court cannot render a definitive determination and recommends users exercise heightened caution while monitoring for additional evidence.");
        }
    }

    text
}

fn recommendations(evidence: &EvidenceSummary, verdict: Verdict, risk_score: f64) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();
    let indicators = &evidence.risk_indicators;

    match verdict {
        Verdict::LikelyFraud => {
            recs.push("AVOID ALL INTERACTION: Do not send funds to this wallet under any circumstances.".into());
            recs.push("WARNING TO OTHERS: Consider reporting this wallet to blockchain security databases if you have evidence of fraud.".into());
            if !evidence.graph.edges.is_empty() {
                recs.push("CHECK YOUR CONNECTIONS: If you have interacted with this wallet, review your transaction history for suspicious activity.".into());
            }
            recs.push("ENHANCED MONITORING: Add this wallet to your watchlist and monitor for any attempts to contact you from associated addresses.".into());
            if indicators.mixer_usage {
                recs.push("TRACE OBFUSCATION: This wallet uses mixers. Funds may be difficult to trace or recover.".into());
            }
        }
        Verdict::LikelyClean => {
            recs.push("STANDARD PRECAUTIONS: This wallet appears legitimate, but always verify addresses and use standard security practices.".into());
            recs.push("VERIFY CONTRACTS: If interacting with smart contracts from this wallet, review contract code independently.".into());
            recs.push("STAY VIGILANT: Even legitimate wallets can be compromised. Monitor transactions and revoke approvals periodically.".into());
            if indicators.cex_interaction {
                recs.push("CEX VERIFICATION: This wallet interacts with exchanges, suggesting possible KYC compliance.".into());
            }
        }
        Verdict::Inconclusive => {
            recs.push("EXERCISE EXTREME CAUTION: The evidence is insufficient for a clear determination. Proceed with heightened vigilance.".into());
            recs.push("LIMITED EXPOSURE: If you must interact, start with minimal amounts to test behavior.".into());
            recs.push("INDEPENDENT VERIFICATION: Conduct additional research through multiple blockchain explorers and community forums.".into());
            recs.push(format!(
                "RISK THRESHOLD: With a risk score of {:.1}/100, this wallet requires careful monitoring before any significant interaction.",
                risk_score
            ));
            recs.push("SEEK SECOND OPINION: Consider consulting additional blockchain forensics services for corroboration.".into());
        }
    }

    recs.push("NEVER SHARE PRIVATE KEYS: Legitimate projects never ask for your private keys or seed phrases.".into());
    recs.push("USE HARDWARE WALLETS: For significant holdings, always use hardware wallet security.".into());
    recs
}
