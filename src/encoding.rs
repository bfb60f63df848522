//! Feature encoding for the risk model.
//!
//! Rescales raw snapshot features into comparable, mostly `[0, 1]` ranges
//! using fixed normalization constants. Stateless and deterministic.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::features::FeatureSnapshot;

const TRANSFORMED_DIM: usize = 11;

// ---------------------------------------------------------------------------
// Transformed feature names
// ---------------------------------------------------------------------------

/// Model inputs derived from a snapshot, in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformedFeature {
    SuspiciousDensity,
    ApprovalDensity,
    GiftRatio,
    NftDumpRatio,
    TxnVelocity,
    TurnoverRatio,
    ZeroValueRatio,
    MintIntensity,
    NeighborSpread,
    ValueDelta,
    /// Informational only; carries no weight.
    TransferDensity,
}

impl TransformedFeature {
    pub const ALL: [TransformedFeature; TRANSFORMED_DIM] = [
        Self::SuspiciousDensity,
        Self::ApprovalDensity,
        Self::GiftRatio,
        Self::NftDumpRatio,
        Self::TxnVelocity,
        Self::TurnoverRatio,
        Self::ZeroValueRatio,
        Self::MintIntensity,
        Self::NeighborSpread,
        Self::ValueDelta,
        Self::TransferDensity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuspiciousDensity => "suspicious_density",
            Self::ApprovalDensity => "approval_density",
            Self::GiftRatio => "gift_ratio",
            Self::NftDumpRatio => "nft_dump_ratio",
            Self::TxnVelocity => "txn_velocity",
            Self::TurnoverRatio => "turnover_ratio",
            Self::ZeroValueRatio => "zero_value_ratio",
            Self::MintIntensity => "mint_intensity",
            Self::NeighborSpread => "neighbor_spread",
            Self::ValueDelta => "value_delta",
            Self::TransferDensity => "transfer_density",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for TransformedFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Normalization constants
// ---------------------------------------------------------------------------

/// Divisors used to bring raw features into comparable ranges.
///
/// `suspicious_func_count`, `approval_func_count`, `transfer_func_count` and
/// `total_txn` are published with the table but unused: the density features
/// divide by the transaction count instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConstants {
    pub txn_velocity: f64,
    pub nft_dump_ratio: f64,
    pub turnover_ratio: f64,
    pub avg_floor_price_out: f64,
    pub avg_floor_price_in: f64,
    pub mint_txn_count: f64,
    pub out_neighbors: f64,
    pub suspicious_func_count: f64,
    pub approval_func_count: f64,
    pub transfer_func_count: f64,
    pub total_txn: f64,
}

impl Default for NormalizationConstants {
    fn default() -> Self {
        Self {
            txn_velocity: 50.0,
            nft_dump_ratio: 8.0,
            turnover_ratio: 10.0,
            avg_floor_price_out: 2.0,
            avg_floor_price_in: 2.0,
            mint_txn_count: 25.0,
            out_neighbors: 50.0,
            suspicious_func_count: 20.0,
            approval_func_count: 10.0,
            transfer_func_count: 30.0,
            total_txn: 200.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Transformed features
// ---------------------------------------------------------------------------

/// Transformed feature values, indexed by `TransformedFeature`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedFeatures {
    values: [f64; TRANSFORMED_DIM],
}

impl TransformedFeatures {
    pub fn get(&self, feature: TransformedFeature) -> f64 {
        self.values[feature.index()]
    }

    /// `(feature, value)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (TransformedFeature, f64)> + '_ {
        TransformedFeature::ALL
            .into_iter()
            .map(move |f| (f, self.values[f.index()]))
    }
}

impl Serialize for TransformedFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TRANSFORMED_DIM))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.as_str(), &value)?;
        }
        map.end()
    }
}

/// Encode a feature snapshot into model inputs.
pub fn transform(snapshot: &FeatureSnapshot, k: &NormalizationConstants) -> TransformedFeatures {
    let txn_denominator = snapshot.total_txn.max(1.0);

    let suspicious_density = snapshot.suspicious_func_count / txn_denominator;
    let approval_density = snapshot.approval_func_count / txn_denominator;
    let transfer_density = snapshot.transfer_func_count / txn_denominator;

    let gift_ratio = clip((snapshot.gift_in_ratio + snapshot.gift_out_ratio) / 2.0);
    let nft_dump_ratio = clip(snapshot.nft_dump_ratio / k.nft_dump_ratio);
    let txn_velocity = clip(snapshot.txn_velocity / k.txn_velocity);
    let turnover_ratio = clip(snapshot.turnover_ratio / k.turnover_ratio);
    let zero_value_ratio = clip(snapshot.zero_value_ratio);
    let mint_intensity = clip(snapshot.mint_txn_count / k.mint_txn_count);
    let neighbor_spread =
        clip((snapshot.out_neighbors + snapshot.in_neighbors) / (2.0 * k.out_neighbors));

    // signed, unclamped
    let value_delta = snapshot.avg_floor_price_out / k.avg_floor_price_out
        - snapshot.avg_floor_price_in / k.avg_floor_price_in;

    TransformedFeatures {
        values: [
            suspicious_density,
            approval_density,
            gift_ratio,
            nft_dump_ratio,
            txn_velocity,
            turnover_ratio,
            zero_value_ratio,
            mint_intensity,
            neighbor_spread,
            value_delta,
            transfer_density,
        ]
        .map(finite_or_zero),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Cap a value at 1.0. Values below zero pass through.
fn clip(value: f64) -> f64 {
    value.min(1.0)
}
