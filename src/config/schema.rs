//! Configuration schema types
//!
//! [`Settings`] is the canonical shape every settings source resolves to.
//! [`LoggingConfig`] is assembled from command-line options.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::Deserialize;

/// Field names accepted in a JSON settings document, in canonical camelCase
pub(crate) const SETTINGS_FIELDS: &[&str] = &[
    "connectionString",
    "defaultOutputPath",
    "solutionConfigs",
    "solutionName",
    "outputPath",
    "outputFilename",
];

/// Main settings
///
/// Constructed once at startup and read-only afterwards.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// CRM connection string (`Key=Value;...`), contains credentials
    pub connection_string: SecretString,

    /// Output directory used when a solution entry has no override
    #[serde(default)]
    pub default_output_path: Option<String>,

    /// Solutions to export, in declaration order
    #[serde(default)]
    pub solution_configs: Vec<SolutionConfig>,
}

impl Settings {
    /// Validates the settings
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is blank, no solutions are
    /// configured, or a solution entry has a blank name
    pub fn validate(&self) -> Result<(), String> {
        if self.connection_string.expose_secret().is_blank() {
            return Err("connectionString cannot be empty".to_string());
        }

        if self.solution_configs.is_empty() {
            return Err("at least one solution must be configured".to_string());
        }

        if let Some(position) = self
            .solution_configs
            .iter()
            .position(|config| config.solution_name.trim().is_empty())
        {
            return Err(format!(
                "solutionConfigs[{position}].solutionName cannot be empty"
            ));
        }

        Ok(())
    }

    /// Effective output directory for a solution entry
    ///
    /// The entry's own `outputPath` wins over `defaultOutputPath`. Blank values
    /// count as unset.
    pub fn output_directory_for<'a>(&'a self, config: &'a SolutionConfig) -> Option<&'a str> {
        non_blank(config.output_path.as_deref())
            .or_else(|| non_blank(self.default_output_path.as_deref()))
    }
}

/// One solution export request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionConfig {
    /// Unique name of the solution in the CRM
    pub solution_name: String,

    /// Output directory override
    #[serde(default)]
    pub output_path: Option<String>,

    /// Output filename override; when blank the name is generated
    #[serde(default)]
    pub output_filename: Option<String>,
}

impl SolutionConfig {
    /// Create an entry with no overrides
    pub fn new(solution_name: impl Into<String>) -> Self {
        Self {
            solution_name: solution_name.into(),
            output_path: None,
            output_filename: None,
        }
    }

    /// Set the output directory override
    pub fn with_output_path(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Set the output filename override
    pub fn with_output_filename(mut self, output_filename: impl Into<String>) -> Self {
        self.output_filename = Some(output_filename.into());
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Enable local file logging
    pub local_enabled: bool,

    /// Directory the rolling log files are written to
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Validates the logging configuration
    pub fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid log rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("log directory cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
