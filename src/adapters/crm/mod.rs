//! CRM adapter implementation
//!
//! This module provides the integration with Dataverse (Dynamics 365 CRM):
//! connection string parsing, OAuth token acquisition, and the Web API calls
//! used to query solution versions and export solutions.

pub mod auth;
pub mod connection;
pub mod dataverse;
pub mod models;
mod r#trait;

pub use connection::{AuthType, ConnectionString};
pub use dataverse::{DataverseClient, DataverseConnector};
pub use r#trait::{CrmConnector, SolutionService};
