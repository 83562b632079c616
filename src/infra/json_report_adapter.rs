use crate::app::ports::ReportOutputPort;
use crate::app::report_use_case::RunReport;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the run report as a single pretty-printed JSON document
pub struct JsonReportAdapter {
    file_path: PathBuf,
}

impl JsonReportAdapter {
    pub fn new(file_path: &Path) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[async_trait::async_trait]
impl ReportOutputPort for JsonReportAdapter {
    async fn write_report(&self, report: &RunReport) -> anyhow::Result<()> {
        if let Some(dir) = self.file_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&self.file_path, json).await?;

        info!(path = %self.file_path.display(), "Report written");
        Ok(())
    }
}
