//! Export coordinator - main orchestrator for the export process
//!
//! Loads settings, opens one CRM session and exports every configured
//! solution in order. A failing solution is logged and recorded in the
//! summary; the batch always continues with the next one. Setup failures
//! (settings or connection) end the run and mark the execution failed.

use crate::adapters::crm::{CrmConnector, SolutionService};
use crate::config::{load_settings, Settings, SettingsSource, SolutionConfig};
use crate::core::export::path::resolve_output_path;
use crate::core::export::summary::{ExportSummary, WrittenArchive};
use crate::domain::{ExportedSolution, ExporterError, PackageType, Result};
use crate::logging::ExecutionLog;
use crate::{log_error_with_context, log_solution_start, log_solution_written};
use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Export coordinator
pub struct ExportCoordinator {
    connector: Arc<dyn CrmConnector>,
    package_type: PackageType,
}

impl ExportCoordinator {
    /// Create a coordinator that exports unmanaged packages
    pub fn new(connector: Arc<dyn CrmConnector>) -> Self {
        Self {
            connector,
            package_type: PackageType::Unmanaged,
        }
    }

    /// Execute a full run
    ///
    /// # Errors
    ///
    /// Returns the setup error (settings or connection) after logging it and
    /// marking the execution failed. Per-solution errors are not returned;
    /// they are in the summary.
    pub async fn run(&self, source: &SettingsSource, log: &mut ExecutionLog) -> Result<ExportSummary> {
        let (settings, service) = match self.setup(source, log).await {
            Ok(ready) => ready,
            Err(e) => {
                log.log_error(format!("Setup failed: {e}"));
                log.mark_failed(&e);
                return Err(e);
            }
        };

        let summary = self.export_all(&settings, service.as_ref(), log).await;
        summary.log_summary();
        Ok(summary)
    }

    async fn setup(
        &self,
        source: &SettingsSource,
        log: &ExecutionLog,
    ) -> Result<(Settings, Arc<dyn SolutionService>)> {
        let settings = load_settings(source)?;
        log.log(format!(
            "Loaded {} solution configuration(s)",
            settings.solution_configs.len()
        ));

        let service = self.connector.connect(&settings.connection_string).await?;
        log.log(format!("Connected to {}", service.endpoint()));

        Ok((settings, service))
    }

    /// Export every configured solution through an open session
    pub async fn export_all(
        &self,
        settings: &Settings,
        service: &dyn SolutionService,
        log: &mut ExecutionLog,
    ) -> ExportSummary {
        let start_time = Instant::now();
        let total = settings.solution_configs.len();
        let mut summary = ExportSummary::new(total);

        for (index, config) in settings.solution_configs.iter().enumerate() {
            log_solution_start!(config.solution_name, index + 1, total);

            match self.export_one(settings, config, service, log).await {
                Ok(archive) => summary.record_success(archive),
                Err(e) => {
                    log_error_with_context!(&e, "Solution skipped");
                    log.log_error(format!(
                        "Failed to export solution '{}': {}",
                        config.solution_name, e
                    ));
                    summary.record_failure(&config.solution_name, &e);
                }
            }
        }

        summary.with_duration(start_time.elapsed())
    }

    async fn export_one(
        &self,
        settings: &Settings,
        config: &SolutionConfig,
        service: &dyn SolutionService,
        log: &ExecutionLog,
    ) -> Result<WrittenArchive> {
        let name = config.solution_name.as_str();

        log.log(format!("Retrieving version of solution '{name}'"));
        let version = service.retrieve_version(name).await?;

        log.log(format!("Exporting {} solution '{name}' {version}", self.package_type));
        let archive = service.export_solution(name, self.package_type).await?;
        let exported = ExportedSolution::new(version, archive);

        let directory = settings
            .output_directory_for(config)
            .ok_or_else(|| ExporterError::NoOutputPath(name.to_string()))?;

        let path = resolve_output_path(
            directory,
            config.output_filename.as_deref(),
            name,
            &exported.version,
            Local::now().naive_local(),
        );

        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(directory));
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExporterError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;

        log.log(format!("Writing solution to '{}'", path.display()));
        tokio::fs::write(&path, &exported.archive)
            .await
            .map_err(|e| ExporterError::FileWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;

        log_solution_written!(name, exported.version, path, exported.size());

        Ok(WrittenArchive {
            solution: name.to_string(),
            bytes: exported.size(),
            version: exported.version,
            path,
        })
    }
}
