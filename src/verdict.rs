//! Verdict types and decision mapping for the phishing risk analyzer.
//!
//! Decision mapping:
//! - probability ≥ 0.75 → Phishing / High
//! - probability ≥ 0.50 → Phishing / Medium
//! - otherwise → Benign / Low

use serde::{Deserialize, Serialize};

use crate::features::FeatureSnapshot;
use crate::model::Contribution;
use crate::transaction::TransactionRecord;

/// Probability at or above which an address is labelled phishing.
pub const PHISHING_THRESHOLD: f64 = 0.5;

/// Probability at or above which the risk level is high.
pub const HIGH_RISK_THRESHOLD: f64 = 0.75;

/// Number of contributions surfaced as key signals.
pub const KEY_SIGNAL_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Label and risk level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Benign,
    Phishing,
}

impl Label {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= PHISHING_THRESHOLD {
            Self::Phishing
        } else {
            Self::Benign
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Benign => "benign",
            Self::Phishing => "phishing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if probability >= PHISHING_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Summary and signal descriptions
// ---------------------------------------------------------------------------

/// Human-readable recommendation for a verdict.
pub fn build_summary(label: Label, risk_level: RiskLevel, probability: f64) -> String {
    let score = probability * 100.0;
    match (label, risk_level) {
        (Label::Phishing, RiskLevel::High) => format!(
            "Wallet shows a very high phishing risk (score {score:.2}%). \
             Block interactions and escalate to the security team for investigation."
        ),
        (Label::Phishing, _) => format!(
            "Wallet shows signs of phishing (score {score:.2}%). \
             Flag it, review manually and restrict access."
        ),
        (Label::Benign, _) => format!(
            "Wallet assessed as safe (score {score:.2}%). \
             Keep monitoring its transactions periodically to catch anomalies early."
        ),
    }
}

/// Static description of a transformed feature; unknown names echo back.
pub fn describe_feature(name: &str) -> String {
    let description = match name {
        "suspicious_density" => "Ratio of suspicious function calls to total transactions",
        "approval_density" => "Unusual number of approve/permit transactions",
        "gift_ratio" => "Frequency of free NFT transfers received or sent",
        "nft_dump_ratio" => "NFT dumping relative to NFTs received",
        "txn_velocity" => "Transaction speed over the active period",
        "turnover_ratio" => "Value sent out relative to value received",
        "zero_value_ratio" => "Share of 0-ETH transactions carrying tokens",
        "mint_intensity" => "Direct mints from contracts",
        "neighbor_spread" => "Diversity of counterparty addresses",
        "value_delta" => "Floor price difference between incoming and outgoing assets",
        "transfer_density" => "Ratio of transfer function calls",
        other => other,
    };
    description.to_string()
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// One explained contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySignal {
    pub feature: String,
    pub contribution: f64,
    pub description: String,
}

impl From<&Contribution> for KeySignal {
    fn from(c: &Contribution) -> Self {
        let feature = c.feature.as_str();
        Self {
            feature: feature.to_string(),
            contribution: c.value,
            description: describe_feature(feature),
        }
    }
}

/// Final analysis result for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub address: String,
    pub label: Label,
    pub score: f64,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub key_signals: Vec<KeySignal>,
    pub feature_snapshot: FeatureSnapshot,
}

impl Verdict {
    /// Assemble a verdict from a probability and sorted contributions.
    pub fn from_prediction(
        address: String,
        probability: f64,
        contributions: &[Contribution],
        feature_snapshot: FeatureSnapshot,
    ) -> Self {
        let label = Label::from_probability(probability);
        let risk_level = RiskLevel::from_probability(probability);
        Self {
            address,
            label,
            score: probability,
            risk_level,
            summary: build_summary(label, risk_level, probability),
            key_signals: contributions
                .iter()
                .take(KEY_SIGNAL_COUNT)
                .map(KeySignal::from)
                .collect(),
            feature_snapshot,
        }
    }

    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

/// Request body for address analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub address: String,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

/// Response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub verdict: Verdict,
}
