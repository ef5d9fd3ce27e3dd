//! Domain error types
//!
//! This module defines the error hierarchy for the exporter. Setup errors
//! (configuration, connection) abort the whole run; per-solution errors
//! (`SolutionNotFound`, `Export`, `NoOutputPath`, `FileWrite`) are recorded
//! and the batch moves on.
//! Errors don't expose third-party types.

use std::path::PathBuf;
use thiserror::Error;

/// Main exporter error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Settings file passed on the command line does not exist
    #[error("Settings file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Settings file could not be read or parsed
    #[error("Failed to parse settings: {0}")]
    ConfigParse(String),

    /// Required key absent from the flat key store
    #[error("{0} is missing in configuration")]
    MissingConfigKey(String),

    /// Loaded settings are invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connecting to the CRM failed
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Neither the solution entry nor the settings name an output directory
    #[error("No output path configured for solution '{0}'")]
    NoOutputPath(String),

    /// No solution record matches the requested unique name
    #[error("Solution not found in CRM: {0}")]
    SolutionNotFound(String),

    /// The export call failed
    #[error("Failed to export solution '{solution}': {message}")]
    Export { solution: String, message: String },

    /// Writing the archive to disk failed
    #[error("Failed to write '{}': {message}", path.display())]
    FileWrite { path: PathBuf, message: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl ExporterError {
    /// Whether the error came out of settings loading or validation
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ExporterError::ConfigNotFound(_)
                | ExporterError::ConfigParse(_)
                | ExporterError::MissingConfigKey(_)
                | ExporterError::Configuration(_)
        )
    }
}

/// Connection-specific errors
///
/// `Transport` and `Rejected` are the two terminal shapes of a failed connect:
/// the request never completed, or the server answered with an error.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Connection string could not be parsed or lacks required keys
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// The request could not be sent or no response arrived
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Token acquisition failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server responded with an error status
    #[error("Server rejected the connection: {status} - {message}")]
    Rejected { status: u16, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExporterError {
    fn from(err: std::io::Error) -> Self {
        ExporterError::Io(err.to_string())
    }
}
