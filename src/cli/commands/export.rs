//! Export command implementation
//!
//! Runs one export over the Dataverse connector and maps the outcome to a
//! process exit code.

use crate::adapters::crm::DataverseConnector;
use crate::cli::Cli;
use crate::config::SettingsSource;
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::domain::ExporterError;
use crate::logging::ExecutionLog;
use std::sync::Arc;

/// Run completed, including runs with failed solutions
pub const EXIT_SUCCESS: i32 = 0;

/// Settings missing or invalid
pub const EXIT_CONFIGURATION: i32 = 2;

/// CRM connection could not be established
pub const EXIT_CONNECTION: i32 = 4;

/// Any other fatal error
pub const EXIT_FATAL: i32 = 5;

/// Execute the export
pub async fn execute(cli: &Cli) -> anyhow::Result<i32> {
    let mut log = ExecutionLog::start();

    let source = match SettingsSource::from_arg(cli.settings.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            log.log_error(format!("Failed to read settings: {e}"));
            log.mark_failed(&e);
            log.end();
            eprintln!("Configuration error: {e}");
            return Ok(exit_code_for(&e));
        }
    };

    let coordinator = ExportCoordinator::new(Arc::new(DataverseConnector::new()));
    let result = coordinator.run(&source, &mut log).await;
    log.end();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Export failed: {e}");
            Ok(exit_code_for(&e))
        }
    }
}

/// Exit code for a setup error
pub fn exit_code_for(error: &ExporterError) -> i32 {
    if error.is_configuration() {
        EXIT_CONFIGURATION
    } else if matches!(error, ExporterError::Connection(_)) {
        EXIT_CONNECTION
    } else {
        EXIT_FATAL
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Total Solutions: {}", summary.total_solutions);
    println!("  Successful: {}", summary.successful_exports);
    println!("  Failed: {}", summary.failed_exports);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for archive in &summary.written {
        println!(
            "  {} {} -> {} ({} bytes)",
            archive.solution,
            archive.version,
            archive.path.display(),
            archive.bytes
        );
    }

    if !summary.failures.is_empty() {
        println!();
        println!("⚠️  Solutions not exported:");
        for failure in &summary.failures {
            println!("  - {} ({:?}): {}", failure.solution, failure.kind, failure.message);
        }
    }

    println!();
    if summary.is_successful() {
        println!("✅ Export completed successfully!");
    } else {
        println!("⚠️  Export completed with failures");
    }
}
