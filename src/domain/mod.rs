//! Domain types for the exporter.
//!
//! - **Error types** ([`ExporterError`], [`ConnectionError`])
//! - **Result type alias** ([`Result`])
//! - **Solution values** ([`ExportedSolution`], [`PackageType`])

pub mod errors;
pub mod result;
pub mod solution;

pub use errors::{ConnectionError, ExporterError};
pub use result::Result;
pub use solution::{ExportedSolution, PackageType};
