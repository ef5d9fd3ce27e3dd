//! Dataverse Web API request and response models

use serde::{Deserialize, Serialize};

/// OData collection envelope (`{"value": [...]}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ODataCollection<T> {
    pub value: Vec<T>,
}

/// Row of the `solutions` entity set
#[derive(Debug, Clone, Deserialize)]
pub struct SolutionRecord {
    #[serde(default)]
    pub solutionid: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

/// Body of the `ExportSolution` action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportSolutionRequest<'a> {
    pub solution_name: &'a str,
    pub managed: bool,
}

/// Response of the `ExportSolution` action
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportSolutionResponse {
    /// Base64-encoded solution archive
    pub export_solution_file: String,
}

/// Response of the `WhoAmI` function
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhoAmIResponse {
    pub user_id: String,
    pub business_unit_id: String,
    pub organization_id: String,
}

#[derive(Debug, Deserialize)]
struct ODataErrorEnvelope {
    error: ODataError,
}

#[derive(Debug, Deserialize)]
struct ODataError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Human-readable message from an error response body
///
/// Uses the OData `error.message` when present, otherwise the raw body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ODataErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.code {
            Some(code) if !code.is_empty() => format!("{} ({})", envelope.error.message, code),
            _ => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

/// Quote a value for use in an OData `$filter` string literal
pub fn odata_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
