use chrono::Utc;
use clap::{Parser, Subcommand};
use eyre::{bail, Result, WrapErr};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use scam_radar::{
    config::Config,
    csv_input,
    encoding::{TransformedFeature, TransformedFeatures},
    features::AddressFeatureSnapshot,
    transaction::{TransactionRecord, TransactionTable},
    verdict::{AnalyzeRequest, Verdict},
    AddressAnalyzer, RiskModel,
};

#[derive(Parser)]
#[command(
    name = "scam-radar",
    about = "Wallet phishing risk analyzer: scores an address from its transaction history."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one address and print its verdict
    Analyze {
        /// Transaction file (.json or .csv)
        #[arg(long)]
        input: PathBuf,

        /// Address to analyze (required for CSV files and bare JSON arrays)
        #[arg(long)]
        address: Option<String>,

        /// Output format: summary or json
        #[arg(long, default_value = "summary")]
        format: String,

        /// Save verdict JSON to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the feature snapshot for an address
    Features {
        /// Transaction file (.json or .csv)
        #[arg(long)]
        input: PathBuf,

        /// Address to analyze
        #[arg(long)]
        address: Option<String>,
    },

    /// Start the HTTP server
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show model parameters
    Model,
}

/// Analyze result for JSON output
#[derive(Serialize)]
struct AnalyzeReport<'a> {
    verdict: &'a Verdict,
    transaction_rows: usize,
    model_fingerprint: String,
    analyzed_at: String,
}

/// Feature result for JSON output
#[derive(Serialize)]
struct FeaturesReport {
    #[serde(flatten)]
    snapshot: AddressFeatureSnapshot,
    transformed: TransformedFeatures,
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Load a transaction file and resolve the target address.
///
/// JSON input is either `{address, transactions}` or a bare record array.
fn load_input(path: &Path, address: Option<String>) -> Result<(String, TransactionTable)> {
    if is_csv(path) {
        let table = csv_input::read_path(path)?;
        let Some(address) = address else {
            bail!("--address is required for CSV input");
        };
        return Ok((address, table));
    }

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .wrap_err_with(|| format!("invalid JSON in {}", path.display()))?;

    if value.is_array() {
        let records: Vec<TransactionRecord> = serde_json::from_value(value)?;
        let Some(address) = address else {
            bail!("--address is required when the input is a bare transaction list");
        };
        Ok((address, TransactionTable::from_records(records)))
    } else {
        let request: AnalyzeRequest = serde_json::from_value(value)?;
        let address = address.unwrap_or(request.address);
        Ok((address, TransactionTable::from_records(request.transactions)))
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_analyze(
    input: PathBuf,
    address: Option<String>,
    format: String,
    output: Option<PathBuf>,
) -> Result<i32> {
    let (address, table) = load_input(&input, address)?;
    let transaction_rows = table.len();
    eprintln!("Loaded {} transactions", transaction_rows);

    let analyzer = AddressAnalyzer::new();
    let verdict = analyzer.analyze_table(&address, &table)?;

    match format.as_str() {
        "json" => {
            let report = AnalyzeReport {
                verdict: &verdict,
                transaction_rows,
                model_fingerprint: analyzer.model().fingerprint(),
                analyzed_at: Utc::now().to_rfc3339(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Wallet Phishing Risk Analysis");
            println!("=============================");
            println!("Address:      {}", verdict.address);
            println!("Transactions: {}", verdict.feature_snapshot.total_txn);
            println!();
            println!("Label:        {}", verdict.label);
            println!("Risk level:   {}", verdict.risk_level);
            println!("Score:        {:.2}%", verdict.score * 100.0);
            println!("Summary:      {}", verdict.summary);
            println!();
            println!("Key signals:");
            for signal in &verdict.key_signals {
                println!(
                    "  {:<18} {:+.4}  {}",
                    signal.feature, signal.contribution, signal.description
                );
            }
        }
    }

    if let Some(output_path) = output {
        fs::write(&output_path, serde_json::to_string_pretty(&verdict)?)?;
        eprintln!("Verdict saved to: {}", output_path.display());
    }

    // Exit code: 1 for phishing, 0 otherwise
    if verdict.is_phishing() {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn cmd_features(input: PathBuf, address: Option<String>) -> Result<()> {
    let (address, table) = load_input(&input, address)?;
    let analyzer = AddressAnalyzer::new();
    let snapshot = analyzer
        .extractor()
        .compute_address_features(&address, &table)?;
    let transformed = analyzer.model().transform(&snapshot.features);

    let report = FeaturesReport {
        snapshot,
        transformed,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_serve(bind: Option<String>) -> Result<()> {
    use scam_radar::server::{run_server, ServerConfig};

    let cfg = Config::load();

    let bind_str = bind.unwrap_or_else(|| cfg.bind().to_string());
    let bind_addr = bind_str
        .parse()
        .wrap_err_with(|| format!("Invalid bind address: {}", bind_str))?;

    let config = ServerConfig {
        bind_addr,
        allowed_origins: cfg.allowed_origins.clone(),
        cache_ttl_seconds: cfg.cache_ttl_seconds(),
        cache_max_entries: cfg.cache_max_entries(),
        max_upload_bytes: cfg.max_upload_bytes(),
    };

    tracing::info!("starting scam-radar server");
    tracing::info!(
        cache_ttl_seconds = config.cache_ttl_seconds,
        max_upload_bytes = config.max_upload_bytes,
        "server limits configured"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_server(config))?;

    Ok(())
}

fn cmd_model() -> Result<()> {
    let model = RiskModel::new();
    let params = model.params();

    println!("Phishing Risk Model");
    println!("===================");
    println!("Form:           sigmoid(bias + sum(weight * feature))");
    println!("Bias:           {}", params.bias);
    println!("Weights:");
    for feature in TransformedFeature::ALL {
        match params.weight(feature) {
            Some(weight) => println!("  {:<18} {}", feature.as_str(), weight),
            None => println!("  {:<18} (informational)", feature.as_str()),
        }
    }
    println!("Normalization:");
    let normalization = serde_json::to_value(params.normalization)?;
    if let serde_json::Value::Object(map) = normalization {
        for (name, value) in map {
            println!("  {:<22} {}", name, value);
        }
    }
    println!("Thresholds:     phishing >= 0.5, high risk >= 0.75");
    println!("Fingerprint:    {}", model.fingerprint());

    Ok(())
}

fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scam_radar=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            address,
            format,
            output,
        } => match cmd_analyze(input, address, format, output) {
            Ok(code) => {
                if code != 0 {
                    std::process::exit(code);
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Features { input, address } => cmd_features(input, address),
        Commands::Serve { bind } => cmd_serve(bind),
        Commands::Model => cmd_model(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}
