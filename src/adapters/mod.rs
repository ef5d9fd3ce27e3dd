//! External system integrations.
//!
//! - [`crm`] - Dataverse (Dynamics 365 CRM) Web API integration
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the export
//! orchestration can be tested with in-memory implementations:
//!
//! ```rust,no_run
//! use solution_exporter::adapters::crm::{CrmConnector, DataverseConnector};
//! use solution_exporter::config::secret_string;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = DataverseConnector::new();
//! let connection = secret_string(
//!     "AuthType=ClientSecret;Url=https://org.crm.dynamics.com;ClientId=...;ClientSecret=...".to_string(),
//! );
//!
//! let service = connector.connect(&connection).await?;
//! let version = service.retrieve_version("CoreSolution").await?;
//! # Ok(())
//! # }
//! ```

pub mod crm;
