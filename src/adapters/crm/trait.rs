//! CRM service trait definitions
//!
//! The exporter talks to the CRM through two narrow traits. A
//! [`CrmConnector`] turns a connection string into an authenticated
//! [`SolutionService`]; the service answers version queries and performs
//! exports. Tests substitute in-memory implementations.

use crate::config::SecretString;
use crate::domain::{PackageType, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Opens authenticated sessions against a CRM
#[async_trait]
pub trait CrmConnector: Send + Sync {
    /// Connect using a CRM connection string
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::Connection` when the connection string is
    /// invalid, the transport fails, authentication fails, or the server
    /// rejects the session. Any of these aborts the run.
    async fn connect(&self, connection_string: &SecretString) -> Result<Arc<dyn SolutionService>>;
}

/// Solution operations on a connected CRM
///
/// A session is acquired once per run and reused, sequentially, for every
/// solution.
#[async_trait]
pub trait SolutionService: Send + Sync {
    /// Look up the version of a solution by its unique name
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::SolutionNotFound` when no record matches the
    /// name exactly, and `ExporterError::Export` when the query fails.
    async fn retrieve_version(&self, solution_name: &str) -> Result<String>;

    /// Export a solution and return the archive bytes
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::Export` when the export call fails.
    async fn export_solution(&self, solution_name: &str, package: PackageType) -> Result<Vec<u8>>;

    /// Endpoint this session is connected to
    fn endpoint(&self) -> &str;
}
