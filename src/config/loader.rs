//! Settings loader for JSON settings files and the flat key store
//!
//! Both forms resolve into a single [`Settings`] value; nothing downstream
//! knows which one was used.

use super::schema::{SolutionConfig, Settings, SETTINGS_FIELDS};
use super::secret::secret_string;
use crate::domain::errors::ExporterError;
use crate::domain::result::Result;
use config::Source;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Keys the flat key store must provide, in the order they are checked
pub const FLAT_KEYS: [&str; 4] = [
    "ConnectionString",
    "SolutionNames",
    "OutputPath",
    "OutputFilename",
];

/// Where the settings come from
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// JSON settings document passed on the command line
    JsonFile(PathBuf),

    /// Flat application keys
    FlatKeys(FlatKeyStore),
}

impl SettingsSource {
    /// Picks the source from the optional command-line argument
    ///
    /// With no argument the flat key store is read from the working directory
    /// and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the flat key file exists but cannot be parsed
    pub fn from_arg(settings_path: Option<&Path>) -> Result<Self> {
        match settings_path {
            Some(path) => Ok(SettingsSource::JsonFile(path.to_path_buf())),
            None => Ok(SettingsSource::FlatKeys(FlatKeyStore::from_environment()?)),
        }
    }
}

/// Case-insensitive flat key/value store
///
/// Built from an optional `solution-exporter.{toml,json,yaml,ini}` file
/// layered with `SOLUTION_EXPORTER_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct FlatKeyStore {
    values: HashMap<String, String>,
}

impl FlatKeyStore {
    /// File stem of the optional flat settings file
    pub const FILE_STEM: &'static str = "solution-exporter";

    /// Prefix of environment variables read into the store
    pub const ENV_PREFIX: &'static str = "SOLUTION_EXPORTER";

    /// Load the store from the working directory and the environment
    pub fn from_environment() -> Result<Self> {
        Self::load(Self::FILE_STEM, Self::ENV_PREFIX)
    }

    /// Load the store from `file_stem.*` (optional) and `env_prefix_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed
    pub fn load(file_stem: &str, env_prefix: &str) -> Result<Self> {
        let source = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()
            .map_err(|e| ExporterError::ConfigParse(format!("Failed to read flat keys: {e}")))?;

        let table = source
            .collect()
            .map_err(|e| ExporterError::ConfigParse(format!("Failed to read flat keys: {e}")))?;

        let mut values = HashMap::new();
        for (key, value) in table {
            match value.into_string() {
                Ok(value) => {
                    values.insert(key.to_ascii_lowercase(), value);
                }
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "Skipping non-scalar flat key");
                }
            }
        }

        Ok(Self { values })
    }

    /// Build a store from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        Self { values }
    }

    /// Look up a key, ignoring case
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Loads and validates settings from a source
///
/// # Errors
///
/// Returns `ConfigNotFound`, `ConfigParse` or `MissingConfigKey` when the
/// source cannot be read, and `Configuration` when the loaded settings are
/// invalid.
///
/// # Examples
///
/// ```no_run
/// use solution_exporter::config::{load_settings, SettingsSource};
///
/// let source = SettingsSource::JsonFile("settings.json".into());
/// let settings = load_settings(&source).expect("Failed to load settings");
/// ```
pub fn load_settings(source: &SettingsSource) -> Result<Settings> {
    let settings = match source {
        SettingsSource::JsonFile(path) => {
            tracing::info!(path = %path.display(), "Loading settings file");
            load_json_settings(path)?
        }
        SettingsSource::FlatKeys(store) => {
            tracing::info!("Loading settings from flat configuration keys");
            load_flat_settings(store)?
        }
    };

    settings.validate().map_err(ExporterError::Configuration)?;

    tracing::debug!(
        solutions = settings.solution_configs.len(),
        default_output_path = ?settings.default_output_path,
        "Settings loaded"
    );

    Ok(settings)
}

/// Loads settings from a JSON file
pub fn load_json_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(ExporterError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExporterError::ConfigParse(format!(
            "Failed to read settings file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_json_settings(&contents)
}

/// Parses a JSON settings document
///
/// Keys are matched to the camelCase field names ignoring case, and
/// `${VAR}` placeholders are replaced from the environment first.
pub fn parse_json_settings(contents: &str) -> Result<Settings> {
    let contents = substitute_env_vars(contents)?;

    let document: Value = serde_json::from_str(&contents)
        .map_err(|e| ExporterError::ConfigParse(format!("Invalid JSON: {e}")))?;

    serde_json::from_value(canonicalize_keys(document))
        .map_err(|e| ExporterError::ConfigParse(e.to_string()))
}

/// Builds settings from the four flat keys
///
/// Every name in `SolutionNames` becomes one entry sharing `OutputPath` and
/// `OutputFilename`. No default output path is set in this form.
pub fn load_flat_settings(store: &FlatKeyStore) -> Result<Settings> {
    if let Some(missing) = FLAT_KEYS.iter().find(|key| store.get(key).is_none()) {
        return Err(ExporterError::MissingConfigKey((*missing).to_string()));
    }

    let value = |key: &str| store.get(key).unwrap_or_default().to_string();

    let output_path = value("OutputPath");
    let output_filename = value("OutputFilename");

    let solution_configs = value("SolutionNames")
        .trim_matches(',')
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| SolutionConfig {
            solution_name: name.to_string(),
            output_path: Some(output_path.clone()),
            output_filename: Some(output_filename.clone()),
        })
        .collect();

    Ok(Settings {
        connection_string: secret_string(value("ConnectionString")),
        default_output_path: None,
        solution_configs,
    })
}

fn canonicalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (canonical_key(key), canonicalize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_keys).collect()),
        other => other,
    }
}

fn canonical_key(key: String) -> String {
    SETTINGS_FIELDS
        .iter()
        .find(|field| field.eq_ignore_ascii_case(&key))
        .map(|field| (*field).to_string())
        .unwrap_or(key)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ExporterError::ConfigParse(e.to_string()))?;
    let mut missing_vars: Vec<String> = Vec::new();

    let result = re.replace_all(input, |cap: &Captures| {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(value) => json_escape(&value),
            Err(_) => {
                if !missing_vars.iter().any(|v| v == var_name) {
                    missing_vars.push(var_name.to_string());
                }
                String::new()
            }
        }
    });

    if !missing_vars.is_empty() {
        return Err(ExporterError::ConfigParse(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result.into_owned())
}

// Placeholders sit inside JSON string literals.
fn json_escape(value: &str) -> String {
    let quoted = Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
