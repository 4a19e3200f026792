//! # Scenario Pricer
//!
//! Prices a JSON scenario (catalog, products, adds) and prints the final
//! cart and its price.
//!
//! ## Usage
//! ```bash
//! cargo run -p configurator-cart --bin price-cart -- --scenario ./demo.json
//!
//! # With an explicit config file
//! cargo run -p configurator-cart --bin price-cart -- --scenario ./demo.json --config ./configurator.toml
//!
//! # Verbose
//! RUST_LOG=debug cargo run -p configurator-cart --bin price-cart -- -s ./demo.json
//! ```

use std::env;
use std::path::PathBuf;

use configurator_cart::{ConfiguratorConfig, Scenario};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut scenario_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--scenario" | "-s" => {
                if i + 1 < args.len() {
                    scenario_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let Some(scenario_path) = scenario_path else {
        print_usage();
        return Err("missing --scenario <FILE>".into());
    };

    let config = match config_path {
        Some(path) => ConfiguratorConfig::load(Some(path))?,
        None => ConfiguratorConfig::load_or_default(None),
    };

    info!(path = ?scenario_path, tax_state = %config.pricing.tax_state, "Pricing scenario");

    let scenario = Scenario::from_json(&std::fs::read_to_string(&scenario_path)?)?;
    let report = scenario.run(config)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_usage() {
    println!("Product Configurator Scenario Pricer");
    println!();
    println!("Usage: price-cart --scenario <FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -s, --scenario <FILE>  Scenario JSON (catalog, products, adds)");
    println!("  -c, --config <FILE>    configurator.toml (default: platform config dir)");
    println!("  -h, --help             Show this help message");
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,configurator=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
