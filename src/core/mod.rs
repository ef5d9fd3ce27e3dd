//! Core business logic
//!
//! # Export Workflow
//!
//! 1. **Load settings**: JSON settings file or flat keys
//! 2. **Connect**: open one session against the CRM organization
//! 3. **Export**: for each configured solution, read its version and export
//!    the unmanaged package
//! 4. **Write**: resolve the output path and write the archive
//! 5. **Report**: log and return the export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use solution_exporter::adapters::crm::DataverseConnector;
//! use solution_exporter::config::SettingsSource;
//! use solution_exporter::core::export::ExportCoordinator;
//! use solution_exporter::logging::ExecutionLog;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SettingsSource::from_arg(Some(Path::new("settings.json")))?;
//! let coordinator = ExportCoordinator::new(Arc::new(DataverseConnector::new()));
//!
//! let mut log = ExecutionLog::start();
//! let summary = coordinator.run(&source, &mut log).await?;
//! log.end();
//!
//! println!("Successful: {}", summary.successful_exports);
//! println!("Failed: {}", summary.failed_exports);
//! # Ok(())
//! # }
//! ```

pub mod export;
