// Solution Exporter - Dataverse solution export tool
// Copyright (c) 2025 Solution Exporter Contributors
// Licensed under the MIT License

use clap::Parser;
use solution_exporter::cli::commands::export::{self, EXIT_FATAL};
use solution_exporter::cli::Cli;
use solution_exporter::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Optional; flat keys may come from a .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let guard = match init_logging(&cli.log_level, &cli.logging_config()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Solution Exporter - Dataverse solution export tool"
    );

    let exit_code = match export::execute(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush the file writer first
    drop(guard);
    process::exit(exit_code);
}
