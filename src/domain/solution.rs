//! Solution value types
//!
//! An exported solution is an opaque archive plus the version string the CRM
//! reported for it. Neither is retained beyond writing the archive.

use std::fmt;

/// Result of one successful export call
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedSolution {
    /// Version as reported by the CRM (e.g. `1.0.3.12`)
    pub version: String,

    /// Archive bytes, written verbatim
    pub archive: Vec<u8>,
}

impl ExportedSolution {
    /// Create a new exported solution
    pub fn new(version: impl Into<String>, archive: Vec<u8>) -> Self {
        Self {
            version: version.into(),
            archive,
        }
    }

    /// Archive size in bytes
    pub fn size(&self) -> usize {
        self.archive.len()
    }
}

// Archives can be megabytes; keep Debug output to the size.
impl fmt::Debug for ExportedSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedSolution")
            .field("version", &self.version)
            .field("archive_bytes", &self.archive.len())
            .finish()
    }
}

/// Packaging of an exported solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageType {
    /// Editable in the target environment
    #[default]
    Unmanaged,
    /// Locked down in the target environment
    Managed,
}

impl PackageType {
    /// Value of the `Managed` flag on the export request
    pub fn is_managed(self) -> bool {
        matches!(self, PackageType::Managed)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageType::Unmanaged => write!(f, "unmanaged"),
            PackageType::Managed => write!(f, "managed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_solution_size() {
        let solution = ExportedSolution::new("1.0.0.0", vec![0x50, 0x4b, 0x03, 0x04]);
        assert_eq!(solution.size(), 4);
        assert_eq!(solution.version, "1.0.0.0");
    }

    #[test]
    fn test_debug_hides_archive_bytes() {
        let solution = ExportedSolution::new("2.1", vec![7; 1024]);
        let debug = format!("{solution:?}");
        assert!(debug.contains("archive_bytes: 1024"));
        assert!(!debug.contains("7, 7"));
    }

    #[test]
    fn test_package_type_default_is_unmanaged() {
        assert_eq!(PackageType::default(), PackageType::Unmanaged);
        assert!(!PackageType::Unmanaged.is_managed());
        assert!(PackageType::Managed.is_managed());
        assert_eq!(PackageType::Unmanaged.to_string(), "unmanaged");
    }
}
