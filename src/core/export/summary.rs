//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of a
//! batch of solution exports.

use crate::domain::ExporterError;
use std::path::PathBuf;
use std::time::Duration;

/// Archive written for one solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArchive {
    /// Solution unique name
    pub solution: String,

    /// Version reported by the CRM
    pub version: String,

    /// Where the archive was written
    pub path: PathBuf,

    /// Archive size in bytes
    pub bytes: usize,
}

/// Summary of an export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Number of solutions configured
    pub total_solutions: usize,

    /// Number of archives written
    pub successful_exports: usize,

    /// Number of solutions that failed
    pub failed_exports: usize,

    /// Duration of the batch
    pub duration: Duration,

    /// Archives written, in processing order
    pub written: Vec<WrittenArchive>,

    /// Per-solution failures, in processing order
    pub failures: Vec<ExportFailure>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(total_solutions: usize) -> Self {
        Self {
            total_solutions,
            successful_exports: 0,
            failed_exports: 0,
            duration: Duration::from_secs(0),
            written: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a written archive
    pub fn record_success(&mut self, archive: WrittenArchive) {
        self.successful_exports += 1;
        self.written.push(archive);
    }

    /// Record a failed solution
    pub fn record_failure(&mut self, solution: &str, error: &ExporterError) {
        self.failed_exports += 1;
        self.failures.push(ExportFailure::new(solution, error));
    }

    /// Check if every solution was exported
    pub fn is_successful(&self) -> bool {
        self.failed_exports == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_solutions == 0 {
            return 100.0;
        }
        (self.successful_exports as f64 / self.total_solutions as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total_solutions,
            successful = self.successful_exports,
            failed = self.failed_exports,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export batch completed"
        );

        for failure in &self.failures {
            tracing::warn!(
                solution = %failure.solution,
                kind = ?failure.kind,
                message = %failure.message,
                "Solution export failed"
            );
        }
    }
}

/// Category of a per-solution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No solution with that unique name
    SolutionNotFound,
    /// Version query or export call failed
    Export,
    /// No output directory configured
    OutputPath,
    /// Directory creation or file write failed
    FileWrite,
    /// Session dropped mid-batch (e.g. token refresh failed)
    Connection,
    /// Anything else
    Unknown,
}

impl From<&ExporterError> for FailureKind {
    fn from(error: &ExporterError) -> Self {
        match error {
            ExporterError::SolutionNotFound(_) => FailureKind::SolutionNotFound,
            ExporterError::Export { .. } => FailureKind::Export,
            ExporterError::NoOutputPath(_) => FailureKind::OutputPath,
            ExporterError::FileWrite { .. } | ExporterError::Io(_) => FailureKind::FileWrite,
            ExporterError::Connection(_) => FailureKind::Connection,
            _ => FailureKind::Unknown,
        }
    }
}

/// A solution that could not be exported
#[derive(Debug, Clone)]
pub struct ExportFailure {
    /// Solution unique name
    pub solution: String,

    /// Failure category
    pub kind: FailureKind,

    /// Error message
    pub message: String,
}

impl ExportFailure {
    /// Create a failure record from an error
    pub fn new(solution: &str, error: &ExporterError) -> Self {
        Self {
            solution: solution.to_string(),
            kind: FailureKind::from(error),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(solution: &str) -> WrittenArchive {
        WrittenArchive {
            solution: solution.to_string(),
            version: "1.0".to_string(),
            path: PathBuf::from(format!("out/{solution}.zip")),
            bytes: 10,
        }
    }

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new(3);

        assert_eq!(summary.total_solutions, 3);
        assert_eq!(summary.successful_exports, 0);
        assert_eq!(summary.failed_exports, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.written.is_empty());
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new(1).with_duration(Duration::from_secs(120));
        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_record_success_and_failure() {
        let mut summary = ExportSummary::new(2);
        summary.record_success(archive("Core"));
        summary.record_failure("Portal", &ExporterError::SolutionNotFound("Portal".to_string()));

        assert_eq!(summary.successful_exports, 1);
        assert_eq!(summary.failed_exports, 1);
        assert!(!summary.is_successful());
        assert_eq!(summary.written[0].solution, "Core");
        assert_eq!(summary.failures[0].kind, FailureKind::SolutionNotFound);
        assert!(summary.failures[0].message.contains("Portal"));
    }

    #[test]
    fn test_export_summary_success_rate() {
        let mut summary = ExportSummary::new(4);
        summary.successful_exports = 3;
        assert_eq!(summary.success_rate(), 75.0);

        summary.total_solutions = 0;
        assert_eq!(summary.success_rate(), 100.0);
    }

    #[test]
    fn test_failure_kind_mapping() {
        let export = ExporterError::Export {
            solution: "Core".to_string(),
            message: "timeout".to_string(),
        };
        let write = ExporterError::FileWrite {
            path: PathBuf::from("out/core.zip"),
            message: "read-only file system".to_string(),
        };

        assert_eq!(FailureKind::from(&export), FailureKind::Export);
        assert_eq!(FailureKind::from(&write), FailureKind::FileWrite);
        assert_eq!(
            FailureKind::from(&ExporterError::NoOutputPath("Core".to_string())),
            FailureKind::OutputPath
        );
    }
}
