//! Fixed linear risk model.
//!
//! `probability = sigmoid(bias + Σ weight · transformed)`. The weights are
//! hand-set constants, not learned; the parameter set is immutable once the
//! model is built and can be shared across threads without locking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::encoding::{transform, NormalizationConstants, TransformedFeature, TransformedFeatures};
use crate::features::FeatureSnapshot;

/// Version prefix mixed into the parameter fingerprint.
const PARAMS_HASH_VERSION: &str = "v1";

/// Bias, weights and normalization constants of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub bias: f64,
    pub weights: BTreeMap<TransformedFeature, f64>,
    pub normalization: NormalizationConstants,
}

impl Default for ModelParams {
    fn default() -> Self {
        use TransformedFeature::*;
        let weights = [
            (SuspiciousDensity, 2.2),
            (ApprovalDensity, 1.6),
            (GiftRatio, 1.3),
            (NftDumpRatio, 1.1),
            (TxnVelocity, 1.0),
            (TurnoverRatio, 0.9),
            (ZeroValueRatio, 1.1),
            (MintIntensity, 0.6),
            (NeighborSpread, 0.7),
            (ValueDelta, 0.8),
        ]
        .into_iter()
        .collect();

        Self {
            bias: -1.15,
            weights,
            normalization: NormalizationConstants::default(),
        }
    }
}

impl ModelParams {
    pub fn weight(&self, feature: TransformedFeature) -> Option<f64> {
        self.weights.get(&feature).copied()
    }
}

/// A weighted transformed feature's additive effect on the linear score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: TransformedFeature,
    pub value: f64,
}

/// Output of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Sigmoid of the linear score, in `[0, 1]`.
    pub probability: f64,
    pub linear_score: f64,
    /// One entry per weighted feature, by descending absolute value.
    pub contributions: Vec<Contribution>,
    pub transformed: TransformedFeatures,
}

/// The phishing risk model.
#[derive(Debug, Clone, Default)]
pub struct RiskModel {
    params: ModelParams,
}

impl RiskModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: ModelParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn transform(&self, snapshot: &FeatureSnapshot) -> TransformedFeatures {
        transform(snapshot, &self.params.normalization)
    }

    /// Score a snapshot.
    pub fn predict(&self, snapshot: &FeatureSnapshot) -> Prediction {
        let transformed = self.transform(snapshot);

        let mut linear_score = self.params.bias;
        let mut contributions = Vec::with_capacity(self.params.weights.len());
        for (feature, value) in transformed.iter() {
            let Some(weight) = self.params.weight(feature) else {
                continue;
            };
            let contribution = weight * value;
            linear_score += contribution;
            contributions.push(Contribution {
                feature,
                value: contribution,
            });
        }

        // stable: ties keep enumeration order
        contributions.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(Ordering::Equal)
        });

        let probability = sigmoid(linear_score);
        tracing::debug!(linear_score, probability, "risk prediction");

        Prediction {
            probability,
            linear_score,
            contributions,
            transformed,
        }
    }

    /// `sha256:<hex>` over the canonical JSON of the parameter set.
    pub fn fingerprint(&self) -> String {
        let serialized = serde_json::to_vec(&self.params)
            .unwrap_or_else(|_| format!("{:?}", self.params).into_bytes());
        let mut hasher = Sha256::new();
        hasher.update(PARAMS_HASH_VERSION.as_bytes());
        hasher.update(&serialized);
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
