//! Fabula CLI binary.
//!
//! Every command prints a JSON envelope on stdout; logs go to stderr.

use clap::Parser;
use fabula::{ObservabilityConfig, init_observability_with_config};
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    let observability = ObservabilityConfig::new("fabula")
        .with_log_level(log_level)
        .with_json_logs(cli.json_logs);
    if let Err(e) = init_observability_with_config(observability) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let envelope = cli::run(cli).await;
    println!("{}", envelope.to_json());

    if envelope.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
