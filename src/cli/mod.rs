//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use crate::config::LoggingConfig;
use clap::Parser;
use std::path::PathBuf;

/// Solution Exporter - export Dataverse solutions to versioned zip files
#[derive(Parser, Debug)]
#[command(name = "solution-exporter")]
#[command(version, about, long_about = None)]
#[command(author = "Solution Exporter Contributors")]
pub struct Cli {
    /// Path to a JSON settings file. Without it the flat keys ConnectionString,
    /// SolutionNames, OutputPath and OutputFilename are read from
    /// solution-exporter.{toml,json,yaml,ini} and SOLUTION_EXPORTER_* variables
    pub settings: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "SOLUTION_EXPORTER_LOG_LEVEL")]
    pub log_level: String,

    /// Directory for the rolling log files
    #[arg(long, default_value = "logs", env = "SOLUTION_EXPORTER_LOG_DIR")]
    pub log_dir: String,

    /// Log file rotation
    #[arg(
        long,
        default_value = "daily",
        value_parser = ["daily", "hourly", "never"],
        env = "SOLUTION_EXPORTER_LOG_ROTATION"
    )]
    pub log_rotation: String,

    /// Log to the console only
    #[arg(long)]
    pub no_log_file: bool,
}

impl Cli {
    /// Logging configuration selected on the command line
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            local_enabled: !self.no_log_file,
            local_path: self.log_dir.clone(),
            local_rotation: self.log_rotation.clone(),
        }
    }
}
