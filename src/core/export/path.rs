//! Output path resolution
//!
//! Decides where an exported archive goes. With an explicit filename the
//! first free `name`, `name-1`, `name-2`, ... in the directory is used. Without
//! one the filename is generated from the solution name, its version and a
//! timestamp; that branch does not check for collisions.
//!
//! Nothing here creates directories or writes files.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Timestamp format used in generated filenames
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Resolve the output path for an exported solution
///
/// # Arguments
///
/// * `directory` - Target directory; trailing `/` and `\` are stripped
/// * `explicit_filename` - Filename override; blank means generate one
/// * `solution_name` - Unique name of the solution
/// * `version` - Version reported by the CRM
/// * `timestamp` - Time stamped into generated filenames
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use solution_exporter::core::export::resolve_output_path;
/// use std::path::Path;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 9)
///     .unwrap()
///     .and_hms_opt(14, 5, 7)
///     .unwrap();
/// let path = resolve_output_path("exports/", None, "Core", "1.0.3.12", at);
/// assert_eq!(path, Path::new("exports").join("Core_1_0_3_12_-_2024-03-09_14-05-07.zip"));
/// ```
pub fn resolve_output_path(
    directory: &str,
    explicit_filename: Option<&str>,
    solution_name: &str,
    version: &str,
    timestamp: NaiveDateTime,
) -> PathBuf {
    let directory = normalize_directory(directory);

    match explicit_filename.filter(|name| !name.trim().is_empty()) {
        Some(filename) => first_free_path(&directory, filename),
        None => directory.join(generated_filename(solution_name, version, timestamp)),
    }
}

/// Filename for an archive without an explicit name
///
/// `{solution}_{version with '.' as '_'}_-_{yyyy-MM-dd_HH-mm-ss}.zip`
pub fn generated_filename(solution_name: &str, version: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}_-_{}.zip",
        solution_name,
        version.replace('.', "_"),
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

fn normalize_directory(directory: &str) -> PathBuf {
    let trimmed = directory.trim_end_matches(|c| c == '/' || c == '\\');

    // A bare root ("/") keeps its separator.
    if trimmed.is_empty() && !directory.is_empty() {
        PathBuf::from(&directory[..1])
    } else {
        PathBuf::from(trimmed)
    }
}

fn first_free_path(directory: &Path, filename: &str) -> PathBuf {
    let candidate = directory.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    let mut suffix: u64 = 1;
    loop {
        let suffixed = match &extension {
            Some(extension) => format!("{stem}-{suffix}.{extension}"),
            None => format!("{stem}-{suffix}"),
        };
        let path = directory.join(suffixed);
        if !path.exists() {
            tracing::debug!(
                requested = %candidate.display(),
                resolved = %path.display(),
                "Output file exists, using suffixed name"
            );
            return path;
        }
        suffix += 1;
    }
}
