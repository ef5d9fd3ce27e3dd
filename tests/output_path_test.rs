//! Integration tests for output path resolution

use chrono::{NaiveDate, NaiveDateTime};
use solution_exporter::core::export::{generated_filename, resolve_output_path};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 12, 5)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

#[test]
fn test_resolved_explicit_path_never_exists() {
    let dir = TempDir::new().unwrap();
    let directory = dir.path().to_string_lossy().to_string();

    // Each resolved path is written before resolving again
    let mut written = Vec::new();
    for _ in 0..4 {
        let path = resolve_output_path(&directory, Some("release.zip"), "Core", "1.0", at(9, 0, 0));
        assert!(!path.exists());
        fs::write(&path, b"zip").unwrap();
        written.push(path.file_name().unwrap().to_string_lossy().to_string());
    }

    assert_eq!(
        written,
        ["release.zip", "release-1.zip", "release-2.zip", "release-3.zip"]
    );
}

#[test]
fn test_resolved_path_stays_in_directory() {
    let dir = TempDir::new().unwrap();
    let directory = format!("{}/", dir.path().display());

    let explicit = resolve_output_path(&directory, Some("core.zip"), "Core", "1.0", at(9, 0, 0));
    let generated = resolve_output_path(&directory, None, "Core", "1.0", at(9, 0, 0));

    assert_eq!(explicit.parent().unwrap(), dir.path());
    assert_eq!(generated.parent().unwrap(), dir.path());
}

#[test]
fn test_generated_name_follows_timestamp() {
    let first = resolve_output_path("out", None, "Sales", "9.0.2.1", at(7, 8, 9));
    let second = resolve_output_path("out", None, "Sales", "9.0.2.1", at(7, 8, 10));

    assert_eq!(
        first,
        Path::new("out").join("Sales_9_0_2_1_-_2024-12-05_07-08-09.zip")
    );
    assert_ne!(first, second);
}

#[test]
fn test_generated_filename_is_stable() {
    assert_eq!(
        generated_filename("Portal", "1.2", at(0, 0, 0)),
        "Portal_1_2_-_2024-12-05_00-00-00.zip"
    );
}

#[test]
fn test_suffix_skips_to_lowest_free_number() {
    let dir = TempDir::new().unwrap();
    for name in ["a.b.zip", "a.b-1.zip", "a.b-2.zip"] {
        fs::write(dir.path().join(name), b"zip").unwrap();
    }
    let directory = dir.path().to_string_lossy().to_string();

    let path = resolve_output_path(&directory, Some("a.b.zip"), "Core", "1.0", at(9, 0, 0));
    assert_eq!(path, dir.path().join("a.b-3.zip"));
}
