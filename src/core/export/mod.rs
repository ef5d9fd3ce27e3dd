//! Export orchestration
//!
//! - Output path resolution for solution archives
//! - Export coordination over a CRM session
//! - Summary and reporting

pub mod coordinator;
pub mod path;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use path::{generated_filename, resolve_output_path};
pub use summary::{ExportFailure, ExportSummary, FailureKind, WrittenArchive};
