//! Dataverse Web API client
//!
//! Implements [`CrmConnector`] and [`SolutionService`] against the Dataverse
//! Web API v9.2. A connection is verified with `WhoAmI` before it is handed to
//! the caller.

use super::auth::{self, AccessToken};
use super::connection::{self, ConnectionString};
use super::models::{
    error_message, odata_literal, ExportSolutionRequest, ExportSolutionResponse, ODataCollection,
    SolutionRecord, WhoAmIResponse,
};
use super::{CrmConnector, SolutionService};
use crate::config::SecretString;
use crate::domain::{ConnectionError, ExporterError, PackageType, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default per-request timeout; exports of large solutions are slow
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Connector producing [`DataverseClient`] sessions
#[derive(Debug, Clone)]
pub struct DataverseConnector {
    timeout: Duration,
}

impl DataverseConnector {
    /// Create a connector with the default request timeout
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for DataverseConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrmConnector for DataverseConnector {
    async fn connect(&self, connection_string: &SecretString) -> Result<Arc<dyn SolutionService>> {
        let connection = connection::parse_secret(connection_string)?;

        tracing::info!(connection = %connection, "Connecting to CRM");
        let client = DataverseClient::connect(connection, self.timeout).await?;
        tracing::info!(endpoint = %client.endpoint(), "Connected");

        Ok(Arc::new(client))
    }
}

/// Authenticated Dataverse session
pub struct DataverseClient {
    http: Client,
    connection: ConnectionString,
    authority: String,
    api_base: String,
    token: Mutex<AccessToken>,
}

impl DataverseClient {
    /// Authenticate and verify a session
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::Transport` when a request cannot be sent,
    /// `ConnectionError::Authentication` when no token can be obtained, and
    /// `ConnectionError::Rejected` when the Web API refuses the session.
    pub async fn connect(connection: ConnectionString, timeout: Duration) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConnectionError::Transport(format!("Failed to build HTTP client: {e}")))?;

        let authority = auth::resolve_authority(&http, &connection).await?;
        let token = auth::acquire_token(&http, &authority, &connection).await?;

        let client = Self {
            http,
            api_base: connection.api_base(),
            connection,
            authority,
            token: Mutex::new(token),
        };

        let who = client.who_am_i().await?;
        tracing::debug!(
            user_id = %who.user_id,
            business_unit_id = %who.business_unit_id,
            organization_id = %who.organization_id,
            "Session verified"
        );

        Ok(client)
    }

    async fn who_am_i(&self) -> Result<WhoAmIResponse> {
        let url = format!("{}/WhoAmI", self.api_base);
        let request = self.authorized(self.http.get(&url)).await?;

        let response = request
            .send()
            .await
            .map_err(|e| ConnectionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectionError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            }
            .into());
        }

        response.json().await.map_err(|e| {
            ExporterError::from(ConnectionError::Rejected {
                status: status.as_u16(),
                message: format!("Unexpected WhoAmI response: {e}"),
            })
        })
    }

    /// Attach standard OData headers and a current bearer token
    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let mut token = self.token.lock().await;
        if token.is_expiring() {
            tracing::debug!("Access token expiring, refreshing");
            *token = auth::acquire_token(&self.http, &self.authority, &self.connection).await?;
        }

        Ok(request
            .header(AUTHORIZATION, token.header_value())
            .header(ACCEPT, "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0"))
    }
}

#[async_trait]
impl SolutionService for DataverseClient {
    async fn retrieve_version(&self, solution_name: &str) -> Result<String> {
        let url = format!("{}/solutions", self.api_base);
        let filter = format!("uniquename eq {}", odata_literal(solution_name));

        tracing::info!(solution = %solution_name, "Retrieving solution version");

        let query_failed = |message: String| ExporterError::Export {
            solution: solution_name.to_string(),
            message: format!("version query failed: {message}"),
        };

        let request = self
            .authorized(
                self.http
                    .get(&url)
                    .query(&[("$select", "version"), ("$filter", filter.as_str())]),
            )
            .await?;

        let response = request
            .send()
            .await
            .map_err(|e| query_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(query_failed(format!(
                "status {status}: {}",
                error_message(&body)
            )));
        }

        let records: ODataCollection<SolutionRecord> = response
            .json()
            .await
            .map_err(|e| query_failed(e.to_string()))?;

        let record = records
            .value
            .into_iter()
            .next()
            .ok_or_else(|| ExporterError::SolutionNotFound(solution_name.to_string()))?;

        let version = record
            .version
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| query_failed("solution record has no version".to_string()))?;

        tracing::info!(
            solution = %solution_name,
            solution_id = ?record.solutionid,
            version = %version,
            "Solution version retrieved"
        );

        Ok(version)
    }

    async fn export_solution(&self, solution_name: &str, package: PackageType) -> Result<Vec<u8>> {
        let url = format!("{}/ExportSolution", self.api_base);

        let export_failed = |message: String| ExporterError::Export {
            solution: solution_name.to_string(),
            message,
        };

        tracing::info!(solution = %solution_name, package = %package, "Exporting solution");

        let body = ExportSolutionRequest {
            solution_name,
            managed: package.is_managed(),
        };
        let request = self.authorized(self.http.post(&url).json(&body)).await?;

        let response = request
            .send()
            .await
            .map_err(|e| export_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(export_failed(format!(
                "status {status}: {}",
                error_message(&body)
            )));
        }

        let exported: ExportSolutionResponse = response
            .json()
            .await
            .map_err(|e| export_failed(format!("unexpected response: {e}")))?;

        let archive = general_purpose::STANDARD
            .decode(exported.export_solution_file.as_bytes())
            .map_err(|e| export_failed(format!("archive is not valid base64: {e}")))?;

        tracing::info!(solution = %solution_name, bytes = archive.len(), "Exported");

        Ok(archive)
    }

    fn endpoint(&self) -> &str {
        self.connection.base_url()
    }
}
