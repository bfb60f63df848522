//! Integration tests for the scam-radar wallet phishing analyzer.
//!
//! Run with: cargo test --test integration

use std::io::Write;

use scam_radar::csv_input;
use scam_radar::encoding::TransformedFeature;
use scam_radar::features::{FeatureExtractor, FeatureSnapshot};
use scam_radar::transaction::{Column, TransactionRecord, TransactionTable};
use scam_radar::verdict::{Label, RiskLevel};
use scam_radar::{AddressAnalyzer, Error, RiskModel};

const TARGET: &str = "0xa11ce00000000000000000000000000000000001";

fn sample_history() -> Vec<TransactionRecord> {
    vec![
        TransactionRecord::new(TARGET, "0xb0b")
            .with_hash("0x01")
            .with_value(2.0)
            .with_token_value(1.0)
            .with_timestamp("2024-01-01 00:00:00")
            .with_function_call(r#"["safeTransferFrom"]"#)
            .with_contract("0xc0ffee")
            .with_floor_price(0.5),
        TransactionRecord::new("0xca7", TARGET)
            .with_hash("0x02")
            .with_value(0.0)
            .with_token_value(3.0)
            .with_timestamp("2024-01-02 00:00:00")
            .with_contract("0xc0ffee")
            .with_floor_price(1.5),
        TransactionRecord::new(TARGET, "0xd06")
            .with_hash("0x03")
            .with_value(1.0)
            .with_token_value(0.0)
            .with_timestamp("2024-01-04 12:00:00")
            .with_function_call("['approve', 'transfer']"),
        TransactionRecord::new("0x0000000000000000000000000000000000000000", TARGET)
            .with_hash("0x04")
            .with_value(0.0)
            .with_token_value(1.0)
            .with_timestamp(1_704_412_800.0)
            .with_contract("0xc0ffee"),
        TransactionRecord::new("0xe1e", "0xf00").with_hash("0x05").with_value(9.0),
    ]
}

// ---------------------------------------------------------------------------
// Error scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_empty_input_rejected() {
    let analyzer = AddressAnalyzer::new();
    let err = analyzer.analyze_records(TARGET, Vec::new()).unwrap_err();
    assert!(matches!(err, Error::EmptyInput));

    let err = FeatureExtractor::new()
        .compute_address_features(TARGET, &TransactionTable::from_records(Vec::new()))
        .unwrap_err();
    assert!(matches!(err, Error::EmptyInput));
}

#[test]
fn test_unknown_address_rejected() {
    let records = vec![TransactionRecord::new("0xaaa", "0xbbb").with_value(1.0)];
    let err = AddressAnalyzer::new()
        .analyze_records("0xCCC", records)
        .unwrap_err();
    match err {
        Error::NoTransactions { address } => assert_eq!(address, "0xccc"),
        other => panic!("expected NoTransactions, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Model scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_bias_only_snapshot_is_benign_low() {
    let mut snapshot = FeatureSnapshot::zeros();
    snapshot.total_txn = 1.0;
    let prediction = RiskModel::new().predict(&snapshot);

    assert!((prediction.linear_score + 1.15).abs() < 1e-12);
    assert!((prediction.probability - 0.2405).abs() < 1e-4);
    assert_eq!(Label::from_probability(prediction.probability), Label::Benign);
    assert_eq!(
        RiskLevel::from_probability(prediction.probability),
        RiskLevel::Low
    );
}

#[test]
fn test_high_linear_score_is_high_risk() {
    let mut snapshot = FeatureSnapshot::zeros();
    snapshot.total_txn = 1.0;
    snapshot.suspicious_func_count = 1.0;
    snapshot.approval_func_count = 1.0;
    let prediction = RiskModel::new().predict(&snapshot);

    assert!(prediction.linear_score >= 3f64.ln());
    assert!(prediction.probability >= 0.75);
    assert_eq!(
        RiskLevel::from_probability(prediction.probability),
        RiskLevel::High
    );
}

#[test]
fn test_approve_heavy_wallet_flagged() {
    let records =
        vec![TransactionRecord::new(TARGET, "0xdrainer").with_function_call(r#"["approve"]"#)];
    let verdict = AddressAnalyzer::new().analyze_records(TARGET, records).unwrap();

    assert_eq!(verdict.label, Label::Phishing);
    assert_eq!(verdict.risk_level, RiskLevel::High);
    assert!(verdict.summary.starts_with("Wallet shows a very high phishing risk"));
    assert_eq!(verdict.key_signals[0].feature, "suspicious_density");
    assert_eq!(
        verdict.key_signals[0].description,
        "Ratio of suspicious function calls to total transactions"
    );
}

// ---------------------------------------------------------------------------
// Feature extraction scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_gift_and_zero_value_features() {
    let records = vec![
        TransactionRecord::new(TARGET, "0xb0b")
            .with_value(100.0)
            .with_token_value(0.0),
        TransactionRecord::new("0xb0b", TARGET)
            .with_value(0.0)
            .with_token_value(5.0),
    ];
    let snapshot = FeatureExtractor::new()
        .compute_address_features(TARGET, &TransactionTable::from_records(records))
        .unwrap();
    let f = snapshot.features;

    assert_eq!(f.gift_in_ratio, 1.0);
    assert_eq!(f.gift_out_ratio, 0.0);
    assert_eq!(f.zero_value_ratio, 0.5);
    assert_eq!(f.zero_value_token_ratio, 0.5);
    assert_eq!(f.turnover_ratio, 0.0);
    assert_eq!(f.nft_dump_ratio, 0.0);
}

#[test]
fn test_approve_function_call_counts() {
    let records =
        vec![TransactionRecord::new(TARGET, "0xb0b").with_function_call(r#"["approve"]"#)];
    let f = FeatureExtractor::new()
        .compute_address_features(TARGET, &TransactionTable::from_records(records))
        .unwrap()
        .features;

    assert!(f.suspicious_func_count >= 1.0);
    assert!(f.approval_func_count >= 1.0);
    assert_eq!(f.unique_functions, 1.0);
}

#[test]
fn test_sample_history_features() {
    let f = FeatureExtractor::new()
        .compute_address_features(TARGET, &TransactionTable::from_records(sample_history()))
        .unwrap()
        .features;

    assert_eq!(f.out_txn, 2.0);
    assert_eq!(f.in_txn, 2.0);
    assert_eq!(f.total_txn, 4.0);
    assert_eq!(f.out_neighbors, 2.0);
    assert_eq!(f.in_neighbors, 2.0);
    assert_eq!(f.mint_txn_count, 1.0);
    assert_eq!(f.in_collections, 1.0);
    assert_eq!(f.out_collections, 1.0);
    assert_eq!(f.total_value_out, 3.0);
    assert_eq!(f.total_value_in, 0.0);
    assert_eq!(f.in_nft_value, 4.0);
    assert_eq!(f.out_nft_value, 1.0);
    assert_eq!(f.nft_dump_ratio, 0.25);
    // safeTransferFrom matches transferFrom and safeTransferFrom; approve; transfer none
    assert_eq!(f.suspicious_func_count, 3.0);
    assert_eq!(f.transfer_func_count, 2.0);
    assert_eq!(f.approval_func_count, 1.0);
    assert_eq!(f.unique_functions, 3.0);
    // 2024-01-01 .. 2024-01-05
    assert!((f.activity_duration_days - 4.0).abs() < 1e-9);
    assert!((f.txn_velocity - 1.0).abs() < 1e-9);
    assert!((f.avg_time_between_txn - 4.0 * 86_400.0 / 3.0).abs() < 1e-6);
    assert!(f.std_time_between_txn > 0.0);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_row_order_does_not_change_features() {
    let extractor = FeatureExtractor::new();
    let forward = extractor
        .compute_address_features(TARGET, &TransactionTable::from_records(sample_history()))
        .unwrap();

    let mut reversed = sample_history();
    reversed.reverse();
    let backward = extractor
        .compute_address_features(TARGET, &TransactionTable::from_records(reversed))
        .unwrap();

    for ((name, a), (_, b)) in forward.features.iter().zip(backward.features.iter()) {
        assert!((a - b).abs() < 1e-9, "{name} differs: {a} vs {b}");
    }
}

#[test]
fn test_address_case_does_not_change_verdict() {
    let analyzer = AddressAnalyzer::new();
    let lower = analyzer.analyze_records(TARGET, sample_history()).unwrap();
    let upper = analyzer
        .analyze_records(&TARGET.to_uppercase().replacen("0X", "0x", 1), sample_history())
        .unwrap();
    assert_eq!(lower, upper);
}

#[test]
fn test_snapshot_schema_is_fixed() {
    let minimal = vec![TransactionRecord::new(TARGET, "0xb0b")];
    let table = TransactionTable::with_columns(
        minimal,
        [Column::FromAddress, Column::ToAddress].into_iter().collect(),
    );
    let verdict = AddressAnalyzer::new().analyze_table(TARGET, &table).unwrap();

    let json = serde_json::to_value(&verdict.feature_snapshot).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), FeatureSnapshot::NAMES.len());
    for name in FeatureSnapshot::NAMES {
        assert!(keys.contains(&name), "missing {name}");
    }
    assert!(verdict.feature_snapshot.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_verdict_invariants() {
    let verdict = AddressAnalyzer::new()
        .analyze_records(TARGET, sample_history())
        .unwrap();

    assert!((0.0..=1.0).contains(&verdict.score));
    assert_eq!(verdict.address, TARGET);
    assert_eq!(verdict.key_signals.len(), 5);
    for pair in verdict.key_signals.windows(2) {
        assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
    }
    assert!(verdict
        .key_signals
        .iter()
        .all(|s| s.feature != TransformedFeature::TransferDensity.as_str()));
}

#[test]
fn test_contributions_cover_weighted_features() {
    let analyzer = AddressAnalyzer::new();
    let snapshot = analyzer
        .extractor()
        .compute_address_features(TARGET, &TransactionTable::from_records(sample_history()))
        .unwrap();
    let prediction = analyzer.model().predict(&snapshot.features);

    assert_eq!(prediction.contributions.len(), 10);
    let sum: f64 = prediction.contributions.iter().map(|c| c.value).sum();
    assert!((prediction.linear_score - (-1.15 + sum)).abs() < 1e-9);
}

#[test]
fn test_huge_values_keep_score_in_range() {
    let whale = |from: &str, to: &str| {
        TransactionRecord::new(from, to)
            .with_value(1e308)
            .with_token_value(1e308)
            .with_floor_price(1e308)
    };
    let records = vec![
        whale(TARGET, "0xb0b"),
        whale(TARGET, "0xca7"),
        whale("0xb0b", TARGET),
        whale("0xca7", TARGET),
    ];
    let verdict = AddressAnalyzer::new().analyze_records(TARGET, records).unwrap();

    assert!(verdict.feature_snapshot.values().iter().all(|v| v.is_finite()));
    assert!((0.0..=1.0).contains(&verdict.score));
    assert!(verdict.key_signals.iter().all(|s| s.contribution.is_finite()));

    let json = serde_json::to_value(&verdict).unwrap();
    assert!(json["score"].is_number());
}

// ---------------------------------------------------------------------------
// CSV input
// ---------------------------------------------------------------------------

#[test]
fn test_csv_file_analysis() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(
        file,
        "timestamp,transactionHash,from,to,value,tokenValue,functionCall,contractAddress"
    )
    .unwrap();
    writeln!(file, "2024-01-01 00:00:00,0x1,{TARGET},0xb0b,1,0,\"['approve']\",0xc").unwrap();
    writeln!(file, "2024-01-02 00:00:00,0x2,0xb0b,{TARGET},0,2,,0xc").unwrap();
    writeln!(file, "2024-01-02 00:00:00,0x2,0xb0b,{TARGET},0,2,,0xc").unwrap();
    file.flush().unwrap();

    let table = csv_input::read_path(file.path()).unwrap();
    assert_eq!(table.len(), 3);
    assert!(!table.columns.contains(Column::NftFloorPrice));

    let verdict = AddressAnalyzer::new().analyze_table(TARGET, &table).unwrap();
    let f = &verdict.feature_snapshot;
    assert_eq!(f.in_txn, 2.0);
    // duplicate hash collapses in the combined view
    assert_eq!(f.total_txn, 2.0);
    assert_eq!(f.approval_func_count, 1.0);
    assert_eq!(f.avg_floor_price_in, 0.0);
}

#[test]
fn test_csv_without_value_column_skips_value_features() {
    let data = format!("from_address,to_address,token_value\n{TARGET},0xb0b,1\n0xb0b,{TARGET},4\n");
    let table = csv_input::read_table(data.as_bytes()).unwrap();
    let f = FeatureExtractor::new()
        .compute_address_features(TARGET, &table)
        .unwrap()
        .features;

    assert_eq!(f.zero_value_ratio, 0.0);
    assert_eq!(f.gift_in_ratio, 0.0);
    assert_eq!(f.turnover_ratio, 0.0);
    assert_eq!(f.nft_dump_ratio, 0.25);
}
