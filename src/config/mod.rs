//! Configuration management for the exporter.
//!
//! Settings come from one of two places:
//!
//! - a JSON settings file passed as the only command-line argument
//! - four flat keys (`ConnectionString`, `SolutionNames`, `OutputPath`,
//!   `OutputFilename`) read from an optional `solution-exporter.toml` (or
//!   `.json`, `.yaml`, `.ini`) in the working directory and from
//!   `SOLUTION_EXPORTER_*` environment variables
//!
//! Either way they resolve once into [`Settings`].
//!
//! # Settings File
//!
//! ```json
//! {
//!   "connectionString": "AuthType=ClientSecret;Url=https://org.crm.dynamics.com;ClientId=...;ClientSecret=${CRM_CLIENT_SECRET}",
//!   "defaultOutputPath": "exports",
//!   "solutionConfigs": [
//!     { "solutionName": "CoreSolution" },
//!     { "solutionName": "Portal", "outputPath": "portal", "outputFilename": "portal.zip" }
//!   ]
//! }
//! ```
//!
//! Keys are matched ignoring case. `${VAR_NAME}` placeholders are replaced
//! from the environment before parsing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use solution_exporter::config::{load_settings, SettingsSource};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SettingsSource::from_arg(None)?;
//! let settings = load_settings(&source)?;
//!
//! for solution in &settings.solution_configs {
//!     println!("Will export {}", solution.solution_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_settings, FlatKeyStore, SettingsSource, FLAT_KEYS};
pub use schema::{LoggingConfig, Settings, SolutionConfig};
pub use secret::{secret_string, SecretString, SecretValue};
