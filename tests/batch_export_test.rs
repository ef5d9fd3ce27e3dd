//! Integration tests for the export coordinator with an in-memory CRM

use async_trait::async_trait;
use solution_exporter::adapters::crm::{CrmConnector, SolutionService};
use solution_exporter::config::{FlatKeyStore, SecretString, SettingsSource};
use solution_exporter::core::export::{ExportCoordinator, FailureKind};
use solution_exporter::domain::{ConnectionError, ExporterError, PackageType, Result};
use solution_exporter::logging::ExecutionLog;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

/// In-memory CRM organization
#[derive(Default)]
struct InMemoryCrm {
    versions: HashMap<String, String>,
    broken_exports: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryCrm {
    fn with_solution(mut self, name: &str, version: &str) -> Self {
        self.versions.insert(name.to_string(), version.to_string());
        self
    }

    fn with_broken_export(mut self, name: &str) -> Self {
        self.broken_exports.push(name.to_string());
        self
    }
}

#[async_trait]
impl SolutionService for InMemoryCrm {
    async fn retrieve_version(&self, solution_name: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("version:{solution_name}"));
        self.versions
            .get(solution_name)
            .cloned()
            .ok_or_else(|| ExporterError::SolutionNotFound(solution_name.to_string()))
    }

    async fn export_solution(&self, solution_name: &str, package_type: PackageType) -> Result<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("export:{solution_name}:{package_type}"));
        if self.broken_exports.iter().any(|n| n == solution_name) {
            return Err(ExporterError::Export {
                solution: solution_name.to_string(),
                message: "500 Internal Server Error".to_string(),
            });
        }
        Ok(format!("PK:{solution_name}").into_bytes())
    }

    fn endpoint(&self) -> &str {
        "https://in-memory.crm.example"
    }
}

struct InMemoryConnector {
    crm: Option<Arc<InMemoryCrm>>,
    seen_connection: Mutex<Option<String>>,
}

impl InMemoryConnector {
    fn serving(crm: InMemoryCrm) -> Arc<Self> {
        Arc::new(Self {
            crm: Some(Arc::new(crm)),
            seen_connection: Mutex::new(None),
        })
    }

    fn refusing() -> Arc<Self> {
        Arc::new(Self {
            crm: None,
            seen_connection: Mutex::new(None),
        })
    }
}

#[async_trait]
impl CrmConnector for InMemoryConnector {
    async fn connect(&self, connection_string: &SecretString) -> Result<Arc<dyn SolutionService>> {
        use secrecy::ExposeSecret;
        *self.seen_connection.lock().unwrap() =
            Some(connection_string.expose_secret().as_str().to_string());

        match &self.crm {
            Some(crm) => {
                let service: Arc<dyn SolutionService> = crm.clone();
                Ok(service)
            }
            None => Err(ConnectionError::Transport("connection refused".to_string()).into()),
        }
    }
}

fn json_settings(contents: &str) -> (NamedTempFile, SettingsSource) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    let source = SettingsSource::JsonFile(file.path().to_path_buf());
    (file, source)
}

fn escaped(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\")
}

#[tokio::test]
async fn test_failure_in_middle_does_not_stop_batch() {
    let out = TempDir::new().unwrap();
    let (_file, source) = json_settings(&format!(
        r#"{{
            "connectionString": "AuthType=ClientSecret;Url=https://in-memory.crm.example",
            "defaultOutputPath": "{}",
            "solutionConfigs": [
                {{ "solutionName": "First", "outputFilename": "first.zip" }},
                {{ "solutionName": "Second", "outputFilename": "second.zip" }},
                {{ "solutionName": "Third", "outputFilename": "third.zip" }}
            ]
        }}"#,
        escaped(out.path())
    ));
    let connector = InMemoryConnector::serving(
        InMemoryCrm::default()
            .with_solution("First", "1.0.0.0")
            .with_solution("Second", "2.0.0.0")
            .with_solution("Third", "3.0.0.0")
            .with_broken_export("Second"),
    );
    let coordinator = ExportCoordinator::new(connector.clone());
    let mut log = ExecutionLog::start();

    let summary = coordinator.run(&source, &mut log).await.unwrap();

    assert_eq!(summary.total_solutions, 3);
    assert_eq!(summary.successful_exports, 2);
    assert_eq!(summary.failed_exports, 1);
    assert_eq!(summary.failures[0].solution, "Second");
    assert_eq!(summary.failures[0].kind, FailureKind::Export);

    assert_eq!(std::fs::read(out.path().join("first.zip")).unwrap(), b"PK:First");
    assert!(!out.path().join("second.zip").exists());
    assert_eq!(std::fs::read(out.path().join("third.zip")).unwrap(), b"PK:Third");

    // Per-solution failures leave the execution unmarked
    assert!(!log.is_failed());
    assert!(!log.end().failed);
}

#[tokio::test]
async fn test_solutions_processed_in_declaration_order() {
    let out = TempDir::new().unwrap();
    let (_file, source) = json_settings(&format!(
        r#"{{
            "connectionString": "AuthType=ClientSecret",
            "defaultOutputPath": "{}",
            "solutionConfigs": [
                {{ "solutionName": "B" }},
                {{ "solutionName": "Missing" }},
                {{ "solutionName": "A" }}
            ]
        }}"#,
        escaped(out.path())
    ));
    let crm = Arc::new(
        InMemoryCrm::default()
            .with_solution("A", "1.0")
            .with_solution("B", "1.0"),
    );
    let connector = Arc::new(InMemoryConnector {
        crm: Some(crm.clone()),
        seen_connection: Mutex::new(None),
    });
    let coordinator = ExportCoordinator::new(connector);
    let mut log = ExecutionLog::start();

    coordinator.run(&source, &mut log).await.unwrap();

    let calls = crm.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        [
            "version:B",
            "export:B:unmanaged",
            "version:Missing",
            "version:A",
            "export:A:unmanaged",
        ]
    );
}

#[tokio::test]
async fn test_item_output_path_overrides_default() {
    let default_dir = TempDir::new().unwrap();
    let override_dir = TempDir::new().unwrap();
    let (_file, source) = json_settings(&format!(
        r#"{{
            "connectionString": "AuthType=ClientSecret",
            "defaultOutputPath": "{}",
            "solutionConfigs": [
                {{ "solutionName": "Core", "outputFilename": "core.zip" }},
                {{ "solutionName": "Portal", "outputPath": "{}", "outputFilename": "portal.zip" }},
                {{ "solutionName": "Sales", "outputFilename": "sales.zip" }}
            ]
        }}"#,
        escaped(default_dir.path()),
        escaped(override_dir.path())
    ));
    let connector = InMemoryConnector::serving(
        InMemoryCrm::default()
            .with_solution("Core", "1.0")
            .with_solution("Portal", "1.0")
            .with_solution("Sales", "1.0"),
    );
    let coordinator = ExportCoordinator::new(connector);
    let mut log = ExecutionLog::start();

    let summary = coordinator.run(&source, &mut log).await.unwrap();

    assert!(summary.is_successful());
    assert_eq!(summary.written.len(), 3);
    assert_eq!(summary.written[0].path, default_dir.path().join("core.zip"));
    assert_eq!(summary.written[1].path, override_dir.path().join("portal.zip"));
    assert_eq!(summary.written[2].path, default_dir.path().join("sales.zip"));
    assert!(default_dir.path().join("core.zip").exists());
    assert!(default_dir.path().join("sales.zip").exists());
    assert!(override_dir.path().join("portal.zip").exists());
    assert!(!default_dir.path().join("portal.zip").exists());
    assert!(!override_dir.path().join("sales.zip").exists());
}

#[tokio::test]
async fn test_flat_keys_shared_filename_gets_suffixes() {
    let out = TempDir::new().unwrap();
    let output_path = out.path().to_string_lossy().to_string();
    let source = SettingsSource::FlatKeys(FlatKeyStore::from_pairs([
        ("ConnectionString", "AuthType=ClientSecret".to_string()),
        ("SolutionNames", "Core,Portal".to_string()),
        ("OutputPath", output_path),
        ("OutputFilename", "solution.zip".to_string()),
    ]));
    let connector = InMemoryConnector::serving(
        InMemoryCrm::default()
            .with_solution("Core", "1.0")
            .with_solution("Portal", "2.0"),
    );
    let coordinator = ExportCoordinator::new(connector);
    let mut log = ExecutionLog::start();

    let summary = coordinator.run(&source, &mut log).await.unwrap();

    assert_eq!(summary.written[0].path, out.path().join("solution.zip"));
    assert_eq!(summary.written[1].path, out.path().join("solution-1.zip"));
    assert_eq!(std::fs::read(out.path().join("solution-1.zip")).unwrap(), b"PK:Portal");
}

#[tokio::test]
async fn test_connection_failure_marks_execution_failed() {
    let (_file, source) = json_settings(
        r#"{
            "connectionString": "AuthType=ClientSecret;Url=https://unreachable.example",
            "defaultOutputPath": "out",
            "solutionConfigs": [{ "solutionName": "Core" }]
        }"#,
    );
    let coordinator = ExportCoordinator::new(InMemoryConnector::refusing());
    let mut log = ExecutionLog::start();

    let result = coordinator.run(&source, &mut log).await;

    assert!(matches!(
        result,
        Err(ExporterError::Connection(ConnectionError::Transport(_)))
    ));
    assert!(log.is_failed());
    assert!(log.end().failed);
}

#[tokio::test]
async fn test_connection_string_passed_to_connector() {
    let out = TempDir::new().unwrap();
    let (_file, source) = json_settings(&format!(
        r#"{{
            "connectionString": "AuthType=OAuth;Url=https://org.crm.dynamics.com;Username=u;Password=p",
            "defaultOutputPath": "{}",
            "solutionConfigs": [{{ "solutionName": "Core" }}]
        }}"#,
        escaped(out.path())
    ));
    let connector = InMemoryConnector::serving(InMemoryCrm::default().with_solution("Core", "1.0"));
    let coordinator = ExportCoordinator::new(connector.clone());
    let mut log = ExecutionLog::start();

    coordinator.run(&source, &mut log).await.unwrap();

    assert_eq!(
        connector.seen_connection.lock().unwrap().as_deref(),
        Some("AuthType=OAuth;Url=https://org.crm.dynamics.com;Username=u;Password=p")
    );
}

#[tokio::test]
async fn test_missing_settings_file_marks_execution_failed() {
    let dir = TempDir::new().unwrap();
    let source = SettingsSource::JsonFile(dir.path().join("settings.json"));
    let coordinator = ExportCoordinator::new(InMemoryConnector::refusing());
    let mut log = ExecutionLog::start();

    let result = coordinator.run(&source, &mut log).await;

    assert!(matches!(result, Err(ExporterError::ConfigNotFound(_))));
    assert!(log.is_failed());
}
