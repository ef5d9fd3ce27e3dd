//! Execution log for a single run
//!
//! Created once in `main` and handed to the export coordinator by `&mut`.
//! Messages go through `tracing`, so they reach every layer installed by
//! [`init_logging`](super::init_logging): the console and the rolling file.

use crate::domain::ExporterError;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Outcome written when the execution ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Whether the run was marked failed
    pub failed: bool,

    /// Number of error lines logged
    pub errors: usize,

    /// Wall time of the run
    pub elapsed: Duration,
}

/// Logger capability for one execution
#[derive(Debug)]
pub struct ExecutionLog {
    started: Instant,
    started_at: DateTime<Local>,
    errors: usize,
    failure: Option<String>,
}

impl ExecutionLog {
    /// Start a new execution and write its start record
    pub fn start() -> Self {
        let started_at = Local::now();
        tracing::info!(
            started_at = %started_at.format("%Y-%m-%d %H:%M:%S"),
            "Execution started"
        );

        Self {
            started: Instant::now(),
            started_at,
            errors: 0,
            failure: None,
        }
    }

    /// Local time the execution started
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Log an informational line
    pub fn log(&self, message: impl AsRef<str>) {
        tracing::info!("{}", message.as_ref());
    }

    /// Log an error line
    pub fn log_error(&mut self, message: impl AsRef<str>) {
        self.errors += 1;
        tracing::error!("{}", message.as_ref());
    }

    /// Mark the whole execution as failed
    ///
    /// Only the first failure is kept as the reason.
    pub fn mark_failed(&mut self, error: &ExporterError) {
        tracing::error!(error = %error, "Execution marked as failed");
        if self.failure.is_none() {
            self.failure = Some(error.to_string());
        }
    }

    /// Whether [`mark_failed`](Self::mark_failed) was called
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Reason the execution was marked failed
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Number of error lines logged so far
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Write the execution-end record
    pub fn end(self) -> ExecutionOutcome {
        let outcome = ExecutionOutcome {
            failed: self.is_failed(),
            errors: self.errors,
            elapsed: self.started.elapsed(),
        };

        if outcome.failed {
            tracing::error!(
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                errors = outcome.errors,
                reason = self.failure.as_deref().unwrap_or_default(),
                "Execution ended: FAILED"
            );
        } else {
            tracing::info!(
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                errors = outcome.errors,
                "Execution ended"
            );
        }

        outcome
    }
}
