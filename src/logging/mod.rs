//! Logging and observability
//!
//! - [`init_logging`] installs the tracing subscriber (console plus rolling
//!   JSON file)
//! - [`ExecutionLog`] is the per-run logger handed to the export coordinator
//!
//! # Example
//!
//! ```no_run
//! use solution_exporter::config::LoggingConfig;
//! use solution_exporter::logging::{init_logging, ExecutionLog};
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! let mut log = ExecutionLog::start();
//! log.log("Connected");
//! let outcome = log.end();
//! assert!(!outcome.failed);
//! ```

pub mod execution;
pub mod structured;

pub use execution::{ExecutionLog, ExecutionOutcome};
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a solution export
///
/// # Example
///
/// ```no_run
/// use solution_exporter::log_solution_start;
///
/// log_solution_start!("Core", 1, 3);
/// ```
#[macro_export]
macro_rules! log_solution_start {
    ($solution:expr, $position:expr, $total:expr) => {
        tracing::info!(
            solution = %$solution,
            position = $position,
            total = $total,
            "Exporting solution"
        );
    };
}

/// Log a written solution archive
///
/// # Example
///
/// ```no_run
/// use solution_exporter::log_solution_written;
/// use std::path::Path;
///
/// log_solution_written!("Core", "1.0.0.4", Path::new("out/core.zip"), 2048);
/// ```
#[macro_export]
macro_rules! log_solution_written {
    ($solution:expr, $version:expr, $path:expr, $bytes:expr) => {
        tracing::info!(
            solution = %$solution,
            version = %$version,
            path = %$path.display(),
            bytes = $bytes,
            "Solution file written"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use solution_exporter::log_error_with_context;
/// use solution_exporter::domain::ExporterError;
///
/// let error = ExporterError::SolutionNotFound("Core".to_string());
/// log_error_with_context!(&error, "Skipping solution");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
