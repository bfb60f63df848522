//! Transaction records and the normalization pass.
//!
//! Raw records arrive either from a JSON request or from a decoded CSV file,
//! with loosely typed numeric, timestamp and function-call fields. `prepare`
//! turns them into a fixed-schema `PreparedTable` once, so feature code never
//! has to probe for missing or malformed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw values
// ---------------------------------------------------------------------------

/// A loosely typed field value as it arrived on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Bool(bool),
    Text(String),
    List(Vec<serde_json::Value>),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Every column a transaction table can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Timestamp,
    TransactionHash,
    FromAddress,
    ToAddress,
    Value,
    GasUsed,
    GasPrice,
    TokenValue,
    TokenDecimal,
    ContractAddress,
    FunctionCall,
    TxType,
    NftFloorPrice,
    NftAveragePrice,
    NftTotalVolume,
    NftTotalSales,
    NftNumOwners,
    NftMarketCap,
    Nft7DayVolume,
    Nft7DaySales,
    Nft7DayAvgPrice,
}

impl Column {
    pub const ALL: [Column; 21] = [
        Self::Timestamp,
        Self::TransactionHash,
        Self::FromAddress,
        Self::ToAddress,
        Self::Value,
        Self::GasUsed,
        Self::GasPrice,
        Self::TokenValue,
        Self::TokenDecimal,
        Self::ContractAddress,
        Self::FunctionCall,
        Self::TxType,
        Self::NftFloorPrice,
        Self::NftAveragePrice,
        Self::NftTotalVolume,
        Self::NftTotalSales,
        Self::NftNumOwners,
        Self::NftMarketCap,
        Self::Nft7DayVolume,
        Self::Nft7DaySales,
        Self::Nft7DayAvgPrice,
    ];

    /// Canonical snake_case column name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::TransactionHash => "transaction_hash",
            Self::FromAddress => "from_address",
            Self::ToAddress => "to_address",
            Self::Value => "value",
            Self::GasUsed => "gas_used",
            Self::GasPrice => "gas_price",
            Self::TokenValue => "token_value",
            Self::TokenDecimal => "token_decimal",
            Self::ContractAddress => "contract_address",
            Self::FunctionCall => "function_call",
            Self::TxType => "tx_type",
            Self::NftFloorPrice => "nft_floor_price",
            Self::NftAveragePrice => "nft_average_price",
            Self::NftTotalVolume => "nft_total_volume",
            Self::NftTotalSales => "nft_total_sales",
            Self::NftNumOwners => "nft_num_owners",
            Self::NftMarketCap => "nft_market_cap",
            Self::Nft7DayVolume => "nft_7day_volume",
            Self::Nft7DaySales => "nft_7day_sales",
            Self::Nft7DayAvgPrice => "nft_7day_avg_price",
        }
    }

    /// camelCase name used by the JSON API.
    pub fn wire_alias(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::TransactionHash => "transactionHash",
            Self::FromAddress => "from",
            Self::ToAddress => "to",
            Self::Value => "value",
            Self::GasUsed => "gasUsed",
            Self::GasPrice => "gasPrice",
            Self::TokenValue => "tokenValue",
            Self::TokenDecimal => "tokenDecimal",
            Self::ContractAddress => "contractAddress",
            Self::FunctionCall => "functionCall",
            Self::TxType => "txType",
            Self::NftFloorPrice => "nftFloorPrice",
            Self::NftAveragePrice => "nftAveragePrice",
            Self::NftTotalVolume => "nftTotalVolume",
            Self::NftTotalSales => "nftTotalSales",
            Self::NftNumOwners => "nftNumOwners",
            Self::NftMarketCap => "nftMarketCap",
            Self::Nft7DayVolume => "nft7DayVolume",
            Self::Nft7DaySales => "nft7DaySales",
            Self::Nft7DayAvgPrice => "nft7DayAvgPrice",
        }
    }

    /// Resolve a header name (canonical or wire alias).
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == header || c.wire_alias() == header)
    }

    fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

/// Set of columns a table source actually carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSet(u32);

impl ColumnSet {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Every column; structured requests always carry the full schema.
    pub fn all() -> Self {
        Column::ALL.iter().fold(Self::empty(), |set, c| set.with(*c))
    }

    pub fn with(self, column: Column) -> Self {
        Self(self.0 | column.bit())
    }

    pub fn without(self, column: Column) -> Self {
        Self(self.0 & !column.bit())
    }

    pub fn contains(&self, column: Column) -> bool {
        self.0 & column.bit() != 0
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, c| set.with(c))
    }
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A single on-chain event as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub timestamp: Option<RawValue>,
    #[serde(alias = "transactionHash")]
    pub transaction_hash: Option<String>,
    #[serde(alias = "from")]
    pub from_address: String,
    #[serde(alias = "to")]
    pub to_address: Option<String>,
    pub value: Option<RawValue>,
    #[serde(alias = "gasUsed")]
    pub gas_used: Option<RawValue>,
    #[serde(alias = "gasPrice")]
    pub gas_price: Option<RawValue>,
    #[serde(alias = "tokenValue")]
    pub token_value: Option<RawValue>,
    #[serde(alias = "tokenDecimal")]
    pub token_decimal: Option<RawValue>,
    #[serde(alias = "contractAddress")]
    pub contract_address: Option<String>,
    #[serde(alias = "functionCall")]
    pub function_call: Option<RawValue>,
    #[serde(alias = "txType")]
    pub tx_type: Option<String>,
    #[serde(alias = "nftFloorPrice")]
    pub nft_floor_price: Option<RawValue>,
    #[serde(alias = "nftAveragePrice")]
    pub nft_average_price: Option<RawValue>,
    #[serde(alias = "nftTotalVolume")]
    pub nft_total_volume: Option<RawValue>,
    #[serde(alias = "nftTotalSales")]
    pub nft_total_sales: Option<RawValue>,
    #[serde(alias = "nftNumOwners")]
    pub nft_num_owners: Option<RawValue>,
    #[serde(alias = "nftMarketCap")]
    pub nft_market_cap: Option<RawValue>,
    #[serde(alias = "nft7DayVolume")]
    pub nft_7day_volume: Option<RawValue>,
    #[serde(alias = "nft7DaySales")]
    pub nft_7day_sales: Option<RawValue>,
    #[serde(alias = "nft7DayAvgPrice")]
    pub nft_7day_avg_price: Option<RawValue>,
}

impl TransactionRecord {
    /// Minimal record between two addresses.
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from_address: from.to_string(),
            to_address: Some(to.to_string()),
            ..Default::default()
        }
    }

    /// Set a column from a text cell. Empty cells stay null.
    pub fn set_text(&mut self, column: Column, cell: &str) {
        if cell.is_empty() {
            return;
        }
        let text = || Some(cell.to_string());
        let raw = || Some(RawValue::Text(cell.to_string()));
        match column {
            Column::Timestamp => self.timestamp = raw(),
            Column::TransactionHash => self.transaction_hash = text(),
            Column::FromAddress => self.from_address = cell.to_string(),
            Column::ToAddress => self.to_address = text(),
            Column::Value => self.value = raw(),
            Column::GasUsed => self.gas_used = raw(),
            Column::GasPrice => self.gas_price = raw(),
            Column::TokenValue => self.token_value = raw(),
            Column::TokenDecimal => self.token_decimal = raw(),
            Column::ContractAddress => self.contract_address = text(),
            Column::FunctionCall => self.function_call = raw(),
            Column::TxType => self.tx_type = text(),
            Column::NftFloorPrice => self.nft_floor_price = raw(),
            Column::NftAveragePrice => self.nft_average_price = raw(),
            Column::NftTotalVolume => self.nft_total_volume = raw(),
            Column::NftTotalSales => self.nft_total_sales = raw(),
            Column::NftNumOwners => self.nft_num_owners = raw(),
            Column::NftMarketCap => self.nft_market_cap = raw(),
            Column::Nft7DayVolume => self.nft_7day_volume = raw(),
            Column::Nft7DaySales => self.nft_7day_sales = raw(),
            Column::Nft7DayAvgPrice => self.nft_7day_avg_price = raw(),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(RawValue::Number(value));
        self
    }

    pub fn with_token_value(mut self, token_value: f64) -> Self {
        self.token_value = Some(RawValue::Number(token_value));
        self
    }

    pub fn with_hash(mut self, hash: &str) -> Self {
        self.transaction_hash = Some(hash.to_string());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<RawValue>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_function_call(mut self, function_call: impl Into<RawValue>) -> Self {
        self.function_call = Some(function_call.into());
        self
    }

    pub fn with_contract(mut self, contract: &str) -> Self {
        self.contract_address = Some(contract.to_string());
        self
    }

    pub fn with_floor_price(mut self, floor_price: f64) -> Self {
        self.nft_floor_price = Some(RawValue::Number(floor_price));
        self
    }
}

/// Raw records plus the columns their source carried.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionTable {
    pub records: Vec<TransactionRecord>,
    pub columns: ColumnSet,
}

impl TransactionTable {
    /// Table from structured records, which always carry every column.
    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            columns: ColumnSet::all(),
        }
    }

    pub fn with_columns(records: Vec<TransactionRecord>, columns: ColumnSet) -> Self {
        Self { records, columns }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Prepared (normalized) records
// ---------------------------------------------------------------------------

/// NFT market context attached to a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NftMarketContext {
    pub floor_price: f64,
    pub average_price: f64,
    pub total_volume: f64,
    pub total_sales: f64,
    pub num_owners: f64,
    pub market_cap: f64,
    pub volume_7day: f64,
    pub sales_7day: f64,
    pub avg_price_7day: f64,
}

/// A transaction after normalization: lowercase addresses, finite numbers,
/// parsed timestamp and function list.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTransaction {
    pub timestamp: Option<DateTime<Utc>>,
    pub transaction_hash: Option<String>,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: f64,
    pub gas_used: f64,
    pub gas_price: f64,
    pub token_value: f64,
    pub token_decimal: f64,
    pub contract_address: Option<String>,
    pub function_list: Vec<String>,
    pub tx_type: Option<String>,
    pub nft: NftMarketContext,
}

impl PreparedTransaction {
    /// Zero native value with a positive token value.
    pub fn is_gift(&self) -> bool {
        self.value == 0.0 && self.token_value > 0.0
    }
}

impl From<&PreparedTransaction> for TransactionRecord {
    fn from(tx: &PreparedTransaction) -> Self {
        let num = |v: f64| Some(RawValue::Number(v));
        Self {
            timestamp: tx
                .timestamp
                .map(|t| RawValue::Text(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
            transaction_hash: tx.transaction_hash.clone(),
            from_address: tx.from_address.clone(),
            to_address: tx.to_address.clone(),
            value: num(tx.value),
            gas_used: num(tx.gas_used),
            gas_price: num(tx.gas_price),
            token_value: num(tx.token_value),
            token_decimal: num(tx.token_decimal),
            contract_address: tx.contract_address.clone(),
            function_call: Some(RawValue::List(
                tx.function_list
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect(),
            )),
            tx_type: tx.tx_type.clone(),
            nft_floor_price: num(tx.nft.floor_price),
            nft_average_price: num(tx.nft.average_price),
            nft_total_volume: num(tx.nft.total_volume),
            nft_total_sales: num(tx.nft.total_sales),
            nft_num_owners: num(tx.nft.num_owners),
            nft_market_cap: num(tx.nft.market_cap),
            nft_7day_volume: num(tx.nft.volume_7day),
            nft_7day_sales: num(tx.nft.sales_7day),
            nft_7day_avg_price: num(tx.nft.avg_price_7day),
        }
    }
}

/// Normalized table. Columns absent from the source stay absent here; their
/// per-row values are zero/null placeholders that feature code must not read.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTable {
    pub rows: Vec<PreparedTransaction>,
    pub columns: ColumnSet,
}

impl PreparedTable {
    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(column)
    }

    /// Convert back into raw records carrying the same columns.
    pub fn to_table(&self) -> TransactionTable {
        TransactionTable::with_columns(self.rows.iter().map(Into::into).collect(), self.columns)
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a raw table. The input is only borrowed.
pub fn prepare(table: &TransactionTable) -> PreparedTable {
    let rows = table.records.iter().map(prepare_record).collect();
    PreparedTable {
        rows,
        columns: table.columns,
    }
}

fn prepare_record(record: &TransactionRecord) -> PreparedTransaction {
    let num = |v: &Option<RawValue>| coerce_number(v.as_ref());
    PreparedTransaction {
        timestamp: record.timestamp.as_ref().and_then(parse_timestamp),
        transaction_hash: record.transaction_hash.clone(),
        from_address: normalize_address(&record.from_address),
        to_address: record.to_address.as_deref().map(normalize_address),
        value: num(&record.value),
        gas_used: num(&record.gas_used),
        gas_price: num(&record.gas_price),
        token_value: num(&record.token_value),
        token_decimal: num(&record.token_decimal),
        contract_address: record.contract_address.as_deref().map(normalize_address),
        function_list: record
            .function_call
            .as_ref()
            .map(parse_function_call)
            .unwrap_or_default(),
        tx_type: record.tx_type.clone(),
        nft: NftMarketContext {
            floor_price: num(&record.nft_floor_price),
            average_price: num(&record.nft_average_price),
            total_volume: num(&record.nft_total_volume),
            total_sales: num(&record.nft_total_sales),
            num_owners: num(&record.nft_num_owners),
            market_cap: num(&record.nft_market_cap),
            volume_7day: num(&record.nft_7day_volume),
            sales_7day: num(&record.nft_7day_sales),
            avg_price_7day: num(&record.nft_7day_avg_price),
        },
    }
}

/// Case-fold an address. Idempotent.
pub fn normalize_address(address: &str) -> String {
    address.to_lowercase()
}

/// Coerce a raw value to a finite real; anything unparseable becomes 0.0.
pub fn coerce_number(raw: Option<&RawValue>) -> f64 {
    let parsed = match raw {
        Some(RawValue::Number(n)) => *n,
        Some(RawValue::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(RawValue::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(RawValue::List(_)) | None => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Unix timestamps above this magnitude are read as milliseconds.
const MILLIS_THRESHOLD: f64 = 2e10;

/// Parse a timestamp; unparseable values become `None`.
pub fn parse_timestamp(raw: &RawValue) -> Option<DateTime<Utc>> {
    match raw {
        RawValue::Number(n) => from_unix(*n),
        RawValue::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<f64>() {
                return from_unix(n);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(|naive| naive.and_utc())
        }
        RawValue::Bool(_) | RawValue::List(_) => None,
    }
}

fn from_unix(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() {
        return None;
    }
    if raw.abs() > MILLIS_THRESHOLD {
        // whole milliseconds, split with integer arithmetic
        let millis = raw.round() as i64;
        let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
        return DateTime::from_timestamp(millis.div_euclid(1000), nanos);
    }
    let whole = raw.floor();
    let nanos = (((raw - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Parse a function-call field into an ordered list of function names.
///
/// Tries a JSON list, then a JSON list after swapping single quotes for
/// double quotes (Python repr style). Anything else yields an empty list.
pub fn parse_function_call(raw: &RawValue) -> Vec<String> {
    let text = match raw {
        RawValue::List(items) => return items.iter().map(json_item_to_string).collect(),
        RawValue::Text(s) => s.clone(),
        RawValue::Number(n) => n.to_string(),
        RawValue::Bool(_) => return Vec::new(),
    };

    if text.is_empty() || text == "[]" || text == "{}" {
        return Vec::new();
    }

    let parsed = serde_json::from_str::<serde_json::Value>(&text)
        .or_else(|_| serde_json::from_str::<serde_json::Value>(&text.replace('\'', "\"")));

    match parsed {
        Ok(serde_json::Value::Array(items)) => items.iter().map(json_item_to_string).collect(),
        _ => Vec::new(),
    }
}

fn json_item_to_string(item: &serde_json::Value) -> String {
    match item {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_call_json_list() {
        let raw = RawValue::from(r#"["approve", "transferFrom"]"#);
        assert_eq!(parse_function_call(&raw), vec!["approve", "transferFrom"]);
    }

    #[test]
    fn test_parse_function_call_python_repr() {
        let raw = RawValue::from("['setApprovalForAll']");
        assert_eq!(parse_function_call(&raw), vec!["setApprovalForAll"]);
    }

    #[test]
    fn test_parse_function_call_empty_forms() {
        for s in ["", "[]", "{}", "not a list", "\"approve\"", "{\"a\": 1}"] {
            assert!(parse_function_call(&RawValue::from(s)).is_empty(), "{s}");
        }
        assert!(parse_function_call(&RawValue::Number(5.0)).is_empty());
    }

    #[test]
    fn test_parse_function_call_native_list() {
        let raw = RawValue::List(vec![serde_json::json!("mint"), serde_json::json!(7)]);
        assert_eq!(parse_function_call(&raw), vec!["mint", "7"]);
    }

    #[test]
    fn test_millisecond_timestamps_are_exact() {
        let parsed = parse_timestamp(&RawValue::Number(1_700_000_000_123.0)).unwrap();
        assert_eq!(parsed.timestamp(), 1_700_000_000);
        assert_eq!(parsed.timestamp_subsec_nanos(), 123_000_000);

        let earlier = parse_timestamp(&RawValue::from("1700000000000")).unwrap();
        assert_eq!((parsed - earlier).num_nanoseconds(), Some(123_000_000));

        let negative = parse_timestamp(&RawValue::Number(-1_700_000_000_001.0)).unwrap();
        assert_eq!(negative.timestamp(), -1_700_000_001);
        assert_eq!(negative.timestamp_subsec_nanos(), 999_000_000);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some(&RawValue::from("12.5"))), 12.5);
        assert_eq!(coerce_number(Some(&RawValue::from(" 3 "))), 3.0);
        assert_eq!(coerce_number(Some(&RawValue::from("abc"))), 0.0);
        assert_eq!(coerce_number(Some(&RawValue::Number(f64::INFINITY))), 0.0);
        assert_eq!(coerce_number(Some(&RawValue::Bool(true))), 1.0);
        assert_eq!(coerce_number(None), 0.0);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(parse_timestamp(&RawValue::Number(1_700_000_000.0)), Some(expected));
        assert_eq!(parse_timestamp(&RawValue::from("1700000000")), Some(expected));
        assert_eq!(
            parse_timestamp(&RawValue::Number(1_700_000_000_000.0)),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(&RawValue::from("2023-11-14T22:13:20Z")),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(&RawValue::from("2023-11-14 22:13:20")),
            Some(expected)
        );
        assert!(parse_timestamp(&RawValue::from("2023-11-14")).is_some());
        assert_eq!(parse_timestamp(&RawValue::from("yesterday")), None);
    }

    #[test]
    fn test_normalize_address_idempotent() {
        let once = normalize_address("0xAbCdEF");
        assert_eq!(once, "0xabcdef");
        assert_eq!(normalize_address(&once), once);
    }

    #[test]
    fn test_prepare_is_noop_on_prepared_output() {
        let table = TransactionTable::from_records(vec![
            TransactionRecord::new("0xAAA", "0xBBB")
                .with_value(1.5)
                .with_timestamp("2024-01-01T00:00:00.250Z")
                .with_function_call("['approve']")
                .with_contract("0xCCC"),
            TransactionRecord::new("0xBBB", "0xAAA").with_token_value(3.0),
        ]);
        let once = prepare(&table);
        let twice = prepare(&once.to_table());
        assert_eq!(once, twice);
        assert_eq!(once.rows[0].from_address, "0xaaa");
        assert_eq!(once.rows[0].contract_address.as_deref(), Some("0xccc"));
    }

    #[test]
    fn test_column_set() {
        let set: ColumnSet = [Column::FromAddress, Column::ToAddress].into_iter().collect();
        assert!(set.contains(Column::FromAddress));
        assert!(!set.contains(Column::Value));
        assert!(ColumnSet::all().contains(Column::Nft7DayAvgPrice));
        assert!(!ColumnSet::all().without(Column::Timestamp).contains(Column::Timestamp));
        assert_eq!(Column::from_header("gasUsed"), Some(Column::GasUsed));
        assert_eq!(Column::from_header("nft_7day_sales"), Some(Column::Nft7DaySales));
        assert_eq!(Column::from_header("unknown"), None);
    }

    #[test]
    fn test_record_deserializes_wire_aliases() {
        let json = serde_json::json!({
            "from": "0xA",
            "to": "0xB",
            "transactionHash": "0x01",
            "value": "7",
            "tokenValue": 2,
            "functionCall": "[\"approve\"]",
        });
        let record: TransactionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.from_address, "0xA");
        assert_eq!(record.to_address.as_deref(), Some("0xB"));
        assert_eq!(record.transaction_hash.as_deref(), Some("0x01"));
        assert_eq!(coerce_number(record.value.as_ref()), 7.0);
        assert_eq!(coerce_number(record.token_value.as_ref()), 2.0);
    }
}
