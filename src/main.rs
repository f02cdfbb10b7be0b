//! CLI entry point for the bus token probe harness.
//!
//! Provides subcommands for running the full experiment matrix, firing a
//! single labeled probe, and deriving a token offline.

use anyhow::Result;
use bus_token_probe::{
    canonical::{KeyOrder, canonical_query},
    config::ProbeConfig,
    matrix::{RouteQuery, default_variants, run_matrix},
    probe::{BasicClient, run_probe},
    report::{append_records, print_json, print_summary},
    token::{SpliceRecipe, derive_token},
};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bus_token_probe")]
#[command(about = "Probe token-derivation hypotheses against a live bus API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full experiment matrix for a route and record every outcome
    Matrix {
        /// Route name as the official client sends it
        #[arg(value_name = "ROUTE")]
        route: String,

        /// Direction flag
        #[arg(short, long, default_value = "0")]
        dir: String,

        /// CSV file to append results to
        #[arg(short, long, default_value = "probes.csv")]
        output: String,

        /// Endpoint URL (overrides BUS_API_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Fire a single probe with explicit ordering and optional fields
    Probe {
        #[arg(value_name = "ROUTE")]
        route: String,

        #[arg(short, long, default_value = "0")]
        dir: String,

        /// Hash the parameters in sorted key order instead of insertion order
        #[arg(short, long, default_value_t = false)]
        sorted: bool,

        /// Append a request_id field derived from full-precision local time
        #[arg(long, default_value_t = false)]
        request_id: bool,

        /// Device flag to send
        #[arg(long, default_value = "web")]
        device: String,

        /// Endpoint URL (overrides BUS_API_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Derive and print a token offline, without touching the network
    Token {
        #[arg(value_name = "ROUTE")]
        route: String,

        #[arg(short, long, default_value = "0")]
        dir: String,

        #[arg(short, long, default_value_t = false)]
        sorted: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bus_token_probe.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bus_token_probe.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Matrix {
            route,
            dir,
            output,
            endpoint,
        } => {
            let cfg = config_for(endpoint)?;
            let query = RouteQuery::new(&route, &dir);
            let variants = default_variants(&query, Local::now())?;

            info!(
                route = %route,
                dir = %dir,
                endpoint = %cfg.endpoint,
                variant_count = variants.len(),
                "Starting experiment matrix"
            );

            let client = BasicClient::new();
            let results = run_matrix(&client, &cfg, variants, Local::now).await;

            print_summary(&results);
            append_records(&output, &results)?;
            info!(output = %output, "Results appended");
        }
        Commands::Probe {
            route,
            dir,
            sorted,
            request_id,
            device,
            endpoint,
        } => {
            let cfg = config_for(endpoint)?;

            let mut query = RouteQuery::new(&route, &dir);
            query.device = device;

            let mut params = query.to_params()?;
            if request_id {
                params.push(
                    "request_id",
                    &Local::now().format("%Y%m%d%H%M%S%3f").to_string(),
                )?;
            }

            let order = if sorted {
                KeyOrder::Sorted
            } else {
                KeyOrder::Insertion
            };

            let client = BasicClient::new();
            let result = run_probe(&client, &cfg, "single", &params, order, Local::now()).await;
            print_json(std::slice::from_ref(&result))?;
        }
        Commands::Token { route, dir, sorted } => {
            let query = RouteQuery::new(&route, &dir);
            let params = query.to_params()?;

            let order = if sorted {
                KeyOrder::Sorted
            } else {
                KeyOrder::Insertion
            };

            let canonical = canonical_query(&params, order);
            let token = derive_token(&canonical, Local::now(), &SpliceRecipe::default());

            println!("canonical: {canonical}");
            println!("token:     {token}");
        }
    }

    Ok(())
}

/// Resolves the probe config, preferring an explicit `--endpoint` over the
/// environment.
fn config_for(endpoint: Option<String>) -> Result<ProbeConfig> {
    match endpoint {
        Some(endpoint) => ProbeConfig::for_endpoint(&endpoint),
        None => ProbeConfig::from_env(),
    }
}
