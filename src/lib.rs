//! scam-radar: Web3 wallet phishing risk analyzer
//!
//! Turns an address's transaction history into a fixed-schema feature
//! snapshot, scores it with a hand-weighted logistic model and reports an
//! explained verdict.
//!
//! # Pipeline
//!
//! - **Extract**: `FeatureExtractor` normalizes records and computes 31 features
//! - **Transform**: `encoding::transform` rescales them into 11 model inputs
//! - **Score**: `RiskModel` applies `sigmoid(bias + Σ weight · input)`
//! - **Explain**: `Verdict` carries label, risk level, summary and top signals

pub mod cache;
pub mod config;
pub mod csv_input;
pub mod encoding;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod server;
pub mod transaction;
pub mod verdict;

use std::path::PathBuf;

pub use error::{Error, Result};
pub use features::{AddressFeatureSnapshot, FeatureExtractor, FeatureSnapshot};
pub use model::{ModelParams, Prediction, RiskModel};
pub use transaction::{TransactionRecord, TransactionTable};
pub use verdict::{Label, RiskLevel, Verdict};

// ---------------------------------------------------------------------------
// Directory helpers
// ---------------------------------------------------------------------------

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scam-radar")
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Runs extraction and scoring for one address at a time.
///
/// Holds only read-only configuration; share one instance behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AddressAnalyzer {
    extractor: FeatureExtractor,
    model: RiskModel,
}

impl AddressAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }

    /// Analyze structured records, which carry every column.
    pub fn analyze_records(
        &self,
        address: &str,
        records: Vec<TransactionRecord>,
    ) -> Result<Verdict> {
        if records.is_empty() {
            return Err(Error::EmptyInput);
        }
        self.analyze_table(address, &TransactionTable::from_records(records))
    }

    /// Analyze a table whose column set reflects its source.
    pub fn analyze_table(&self, address: &str, table: &TransactionTable) -> Result<Verdict> {
        let snapshot = self.extractor.compute_address_features(address, table)?;
        Ok(self.verdict_for(snapshot))
    }

    /// Score an already computed snapshot.
    pub fn verdict_for(&self, snapshot: AddressFeatureSnapshot) -> Verdict {
        let prediction = self.model.predict(&snapshot.features);
        let verdict = Verdict::from_prediction(
            snapshot.address,
            prediction.probability,
            &prediction.contributions,
            snapshot.features,
        );

        tracing::debug!(
            address = %verdict.address,
            label = %verdict.label,
            risk_level = %verdict.risk_level,
            score = verdict.score,
            "analysis complete"
        );

        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_records_rejected() {
        let err = AddressAnalyzer::new()
            .analyze_records("0xabc", Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn test_verdict_address_is_lowercased() {
        let records = vec![TransactionRecord::new("0xABC", "0xdef").with_value(1.0)];
        let verdict = AddressAnalyzer::new()
            .analyze_records("0xAbC", records)
            .unwrap();
        assert_eq!(verdict.address, "0xabc");
        assert!(verdict.key_signals.len() <= crate::verdict::KEY_SIGNAL_COUNT);
    }

    #[test]
    fn test_analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AddressAnalyzer>();
    }
}
