//! Address-level feature extraction.
//!
//! Turns a transaction table into a fixed-schema `FeatureSnapshot` for one
//! address. Features fall into five groups (basic, NFT, function, time and
//! value) plus two zero-value ratios. Every group defaults to 0.0 when the
//! columns it needs are absent or its subset of transactions is empty.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transaction::{
    normalize_address, prepare, Column, PreparedTable, PreparedTransaction, TransactionTable,
};

/// Function-name fragments associated with drainer contracts.
pub const SUSPICIOUS_PATTERNS: [&str; 8] = [
    "setApprovalForAll",
    "approve",
    "transferFrom",
    "safeTransferFrom",
    "batchTransfer",
    "multiTransfer",
    "permit",
    "delegateCall",
];

/// Canonical null address; transfers from it are mints.
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Feature snapshot
// ---------------------------------------------------------------------------

/// The complete numeric summary of an address's behaviour.
///
/// Serializes as a flat `name -> value` object. Missing keys deserialize to
/// 0.0, so partial snapshots are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSnapshot {
    // basic
    pub out_txn: f64,
    pub in_txn: f64,
    pub total_txn: f64,
    pub out_neighbors: f64,
    pub in_neighbors: f64,
    pub mint_txn_count: f64,
    pub gift_in_ratio: f64,
    pub gift_out_ratio: f64,
    // nft
    pub in_collections: f64,
    pub out_collections: f64,
    pub in_nft_value: f64,
    pub out_nft_value: f64,
    pub avg_floor_price_in: f64,
    pub avg_floor_price_out: f64,
    pub total_volume: f64,
    pub nft_dump_ratio: f64,
    // function
    pub suspicious_func_count: f64,
    pub transfer_func_count: f64,
    pub approval_func_count: f64,
    pub unique_functions: f64,
    // time
    pub avg_time_between_txn: f64,
    pub std_time_between_txn: f64,
    pub activity_duration_days: f64,
    pub txn_velocity: f64,
    // value
    pub total_value_in: f64,
    pub total_value_out: f64,
    pub avg_value_in: f64,
    pub avg_value_out: f64,
    pub turnover_ratio: f64,
    // zero-value
    pub zero_value_ratio: f64,
    pub zero_value_token_ratio: f64,
}

impl FeatureSnapshot {
    /// Feature names in schema order.
    pub const NAMES: [&'static str; 31] = [
        "out_txn",
        "in_txn",
        "total_txn",
        "out_neighbors",
        "in_neighbors",
        "mint_txn_count",
        "gift_in_ratio",
        "gift_out_ratio",
        "in_collections",
        "out_collections",
        "in_nft_value",
        "out_nft_value",
        "avg_floor_price_in",
        "avg_floor_price_out",
        "total_volume",
        "nft_dump_ratio",
        "suspicious_func_count",
        "transfer_func_count",
        "approval_func_count",
        "unique_functions",
        "avg_time_between_txn",
        "std_time_between_txn",
        "activity_duration_days",
        "txn_velocity",
        "total_value_in",
        "total_value_out",
        "avg_value_in",
        "avg_value_out",
        "turnover_ratio",
        "zero_value_ratio",
        "zero_value_token_ratio",
    ];

    /// Values in the same order as `NAMES`.
    pub fn values(&self) -> [f64; 31] {
        [
            self.out_txn,
            self.in_txn,
            self.total_txn,
            self.out_neighbors,
            self.in_neighbors,
            self.mint_txn_count,
            self.gift_in_ratio,
            self.gift_out_ratio,
            self.in_collections,
            self.out_collections,
            self.in_nft_value,
            self.out_nft_value,
            self.avg_floor_price_in,
            self.avg_floor_price_out,
            self.total_volume,
            self.nft_dump_ratio,
            self.suspicious_func_count,
            self.transfer_func_count,
            self.approval_func_count,
            self.unique_functions,
            self.avg_time_between_txn,
            self.std_time_between_txn,
            self.activity_duration_days,
            self.txn_velocity,
            self.total_value_in,
            self.total_value_out,
            self.avg_value_in,
            self.avg_value_out,
            self.turnover_ratio,
            self.zero_value_ratio,
            self.zero_value_token_ratio,
        ]
    }

    /// `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::NAMES.into_iter().zip(self.values())
    }

    /// Replace every non-finite value with 0.0.
    pub fn finite_or_zero(mut self) -> Self {
        for value in self.values_mut() {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
        self
    }

    fn values_mut(&mut self) -> [&mut f64; 31] {
        [
            &mut self.out_txn,
            &mut self.in_txn,
            &mut self.total_txn,
            &mut self.out_neighbors,
            &mut self.in_neighbors,
            &mut self.mint_txn_count,
            &mut self.gift_in_ratio,
            &mut self.gift_out_ratio,
            &mut self.in_collections,
            &mut self.out_collections,
            &mut self.in_nft_value,
            &mut self.out_nft_value,
            &mut self.avg_floor_price_in,
            &mut self.avg_floor_price_out,
            &mut self.total_volume,
            &mut self.nft_dump_ratio,
            &mut self.suspicious_func_count,
            &mut self.transfer_func_count,
            &mut self.approval_func_count,
            &mut self.unique_functions,
            &mut self.avg_time_between_txn,
            &mut self.std_time_between_txn,
            &mut self.activity_duration_days,
            &mut self.txn_velocity,
            &mut self.total_value_in,
            &mut self.total_value_out,
            &mut self.avg_value_in,
            &mut self.avg_value_out,
            &mut self.turnover_ratio,
            &mut self.zero_value_ratio,
            &mut self.zero_value_token_ratio,
        ]
    }

    /// All-zero snapshot.
    pub fn zeros() -> Self {
        Self::default()
    }
}

/// Features computed for one (lowercased) address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressFeatureSnapshot {
    pub address: String,
    pub features: FeatureSnapshot,
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Computes feature snapshots. Holds only read-only configuration.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    suspicious_patterns: Vec<String>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            suspicious_patterns: SUSPICIOUS_PATTERNS.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Normalize a raw table (see `transaction::prepare`).
    pub fn preprocess(&self, table: &TransactionTable) -> PreparedTable {
        prepare(table)
    }

    /// Compute the feature snapshot for `address`.
    ///
    /// Fails with `EmptyInput` on an empty table and with `NoTransactions`
    /// when no row has the address as sender or receiver.
    pub fn compute_address_features(
        &self,
        address: &str,
        table: &TransactionTable,
    ) -> Result<AddressFeatureSnapshot> {
        if table.is_empty() {
            return Err(Error::EmptyInput);
        }

        let addr = normalize_address(address);
        let prepared = self.preprocess(table);
        let view = AddressView::split(&addr, &prepared);

        if view.all.is_empty() {
            return Err(Error::NoTransactions { address: addr });
        }

        let mut features = FeatureSnapshot::zeros();
        basic_features(&view, &mut features);
        nft_features(&view, &mut features);
        self.function_features(&view, &mut features);
        time_features(&view, &mut features);
        value_features(&view, &mut features);
        zero_value_features(&view, &mut features);
        let features = features.finite_or_zero();

        tracing::debug!(
            address = %addr,
            total_txn = features.total_txn,
            suspicious_func_count = features.suspicious_func_count,
            "computed address features"
        );

        Ok(AddressFeatureSnapshot {
            address: addr,
            features,
        })
    }

    fn function_features(&self, view: &AddressView<'_>, f: &mut FeatureSnapshot) {
        let names: Vec<String> = view
            .all
            .iter()
            .flat_map(|tx| tx.function_list.iter())
            .map(|name| name.to_lowercase())
            .collect();

        let mut suspicious = 0usize;
        for name in &names {
            for pattern in &self.suspicious_patterns {
                if name.contains(pattern.as_str()) {
                    suspicious += 1;
                }
            }
        }

        let transfer = names.iter().filter(|n| n.contains("transfer")).count();
        let approval = names
            .iter()
            .filter(|n| n.contains("approv") || n.contains("permit"))
            .count();
        let unique: HashSet<&str> = names.iter().map(String::as_str).collect();

        f.suspicious_func_count = suspicious as f64;
        f.transfer_func_count = transfer as f64;
        f.approval_func_count = approval as f64;
        f.unique_functions = unique.len() as f64;
    }
}

/// Outgoing, incoming and combined transactions of one address.
struct AddressView<'a> {
    table: &'a PreparedTable,
    out: Vec<&'a PreparedTransaction>,
    inc: Vec<&'a PreparedTransaction>,
    /// `out` followed by `inc`, de-duplicated by hash when hashes exist.
    all: Vec<&'a PreparedTransaction>,
}

impl<'a> AddressView<'a> {
    fn split(addr: &str, table: &'a PreparedTable) -> Self {
        let out: Vec<_> = table.rows.iter().filter(|tx| tx.from_address == addr).collect();
        let inc: Vec<_> = table
            .rows
            .iter()
            .filter(|tx| tx.to_address.as_deref() == Some(addr))
            .collect();

        let mut all: Vec<_> = out.iter().chain(inc.iter()).copied().collect();
        if table.has(Column::TransactionHash) {
            let mut seen = HashSet::new();
            // null hashes are distinct transactions
            all.retain(|&tx| match tx.transaction_hash.as_deref() {
                Some(hash) => seen.insert(hash),
                None => true,
            });
        }

        Self {
            table,
            out,
            inc,
            all,
        }
    }

    fn has(&self, column: Column) -> bool {
        self.table.has(column)
    }
}

// ---------------------------------------------------------------------------
// Feature groups
// ---------------------------------------------------------------------------

fn basic_features(view: &AddressView<'_>, f: &mut FeatureSnapshot) {
    f.out_txn = view.out.len() as f64;
    f.in_txn = view.inc.len() as f64;
    f.total_txn = view.all.len() as f64;

    f.out_neighbors = count_distinct(view.out.iter().filter_map(|tx| tx.to_address.as_deref()));
    f.in_neighbors = count_distinct(view.inc.iter().map(|tx| tx.from_address.as_str()));

    if view.has(Column::ContractAddress) {
        f.mint_txn_count = view
            .inc
            .iter()
            .filter(|tx| {
                tx.contract_address.as_deref() == Some(tx.from_address.as_str())
                    || tx.from_address.starts_with(ZERO_ADDRESS)
            })
            .count() as f64;
    }

    if view.has(Column::Value) && view.has(Column::TokenValue) {
        f.gift_in_ratio = fraction(&view.inc, PreparedTransaction::is_gift);
        f.gift_out_ratio = fraction(&view.out, PreparedTransaction::is_gift);
    }
}

fn nft_features(view: &AddressView<'_>, f: &mut FeatureSnapshot) {
    if view.has(Column::ContractAddress) {
        f.in_collections =
            count_distinct(view.inc.iter().filter_map(|tx| tx.contract_address.as_deref()));
        f.out_collections =
            count_distinct(view.out.iter().filter_map(|tx| tx.contract_address.as_deref()));
    }

    if view.has(Column::TokenValue) {
        f.in_nft_value = saturating_sum(view.inc.iter().map(|tx| tx.token_value));
        f.out_nft_value = saturating_sum(view.out.iter().map(|tx| tx.token_value));
    }

    if view.has(Column::NftFloorPrice) {
        f.avg_floor_price_in = mean(view.inc.iter().map(|tx| tx.nft.floor_price));
        f.avg_floor_price_out = mean(view.out.iter().map(|tx| tx.nft.floor_price));
    }

    if view.has(Column::NftTotalVolume) {
        f.total_volume = saturating_sum(view.all.iter().map(|tx| tx.nft.total_volume));
    }

    f.nft_dump_ratio = safe_ratio(f.out_nft_value, f.in_nft_value);
}

fn time_features(view: &AddressView<'_>, f: &mut FeatureSnapshot) {
    if !view.has(Column::Timestamp) {
        return;
    }

    let mut timestamps: Vec<DateTime<Utc>> =
        view.all.iter().filter_map(|tx| tx.timestamp).collect();
    timestamps.sort_unstable();

    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|w| seconds_between(w[0], w[1]))
        .collect();

    f.avg_time_between_txn = mean(gaps.iter().copied());
    f.std_time_between_txn = sample_std(&gaps);

    f.activity_duration_days = match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => seconds_between(*first, *last) / SECONDS_PER_DAY,
        _ => 0.0,
    };

    let n = view.all.len() as f64;
    f.txn_velocity = if f.activity_duration_days != 0.0 {
        n / f.activity_duration_days.max(1.0)
    } else {
        n
    };
}

fn value_features(view: &AddressView<'_>, f: &mut FeatureSnapshot) {
    if !view.has(Column::Value) {
        return;
    }

    f.total_value_in = saturating_sum(view.inc.iter().map(|tx| tx.value));
    f.total_value_out = saturating_sum(view.out.iter().map(|tx| tx.value));
    f.avg_value_in = mean(view.inc.iter().map(|tx| tx.value));
    f.avg_value_out = mean(view.out.iter().map(|tx| tx.value));
    f.turnover_ratio = safe_ratio(f.total_value_out, f.total_value_in);
}

fn zero_value_features(view: &AddressView<'_>, f: &mut FeatureSnapshot) {
    if !view.has(Column::Value) {
        return;
    }

    f.zero_value_ratio = fraction(&view.all, |tx| tx.value == 0.0);
    if view.has(Column::TokenValue) {
        f.zero_value_token_ratio = fraction(&view.all, PreparedTransaction::is_gift);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn count_distinct<'a>(items: impl Iterator<Item = &'a str>) -> f64 {
    items.collect::<HashSet<_>>().len() as f64
}

/// Fraction of transactions matching `pred`; 0.0 for an empty slice.
fn fraction(txs: &[&PreparedTransaction], pred: impl Fn(&PreparedTransaction) -> bool) -> f64 {
    if txs.is_empty() {
        return 0.0;
    }
    txs.iter().filter(|&&tx| pred(tx)).count() as f64 / txs.len() as f64
}

/// Sum clamped to the finite range, so large finite inputs never reach infinity.
fn saturating_sum(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc, v| (acc + v).clamp(-f64::MAX, f64::MAX))
}

/// Arithmetic mean over a saturating sum; 0.0 for an empty sequence.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| {
        ((s + v).clamp(-f64::MAX, f64::MAX), c + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation (n - 1). Defined as 0.0 below two observations.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// `num / den` when `den > 0`, else 0.0.
fn safe_ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let delta = later - earlier;
    delta
        .num_microseconds()
        .map(|us| us as f64 / 1e6)
        .unwrap_or_else(|| delta.num_seconds() as f64)
}
