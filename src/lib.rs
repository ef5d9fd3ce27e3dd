// Solution Exporter - Dataverse solution export tool
// Copyright (c) 2025 Solution Exporter Contributors
// Licensed under the MIT License

//! # Solution Exporter
//!
//! Exports CRM (Dataverse) solutions as unmanaged packages and writes each
//! one to a zip file named after the solution and its version.
//!
//! ## Overview
//!
//! A run loads its settings, opens one session against the organization and
//! then, for every configured solution, reads the version, exports the
//! package and writes it to the configured directory. A solution that fails
//! is logged and skipped; the others are still exported.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export orchestration, output path resolution and summaries
//! - [`adapters`] - CRM client seam and its Dataverse Web API implementation
//! - [`domain`] - Error taxonomy and solution value types
//! - [`config`] - Settings loading (JSON file or flat keys)
//! - [`logging`] - Structured logging and the per-run execution log
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use solution_exporter::adapters::crm::DataverseConnector;
//! use solution_exporter::config::SettingsSource;
//! use solution_exporter::core::export::ExportCoordinator;
//! use solution_exporter::logging::ExecutionLog;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = SettingsSource::from_arg(Some(Path::new("settings.json")))?;
//!     let coordinator = ExportCoordinator::new(Arc::new(DataverseConnector::new()));
//!
//!     let mut log = ExecutionLog::start();
//!     let summary = coordinator.run(&source, &mut log).await?;
//!     log.end();
//!
//!     println!("Exported {} solutions", summary.successful_exports);
//!     Ok(())
//! }
//! ```
//!
//! ## Output paths
//!
//! ```rust
//! use chrono::NaiveDate;
//! use solution_exporter::core::export::resolve_output_path;
//!
//! let at = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let path = resolve_output_path("out", None, "Core", "1.2.0.0", at);
//! assert!(path.ends_with("Core_1_2_0_0_-_2025-06-01_08-00-00.zip"));
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], carrying a
//! [`domain::ExporterError`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
