use anyhow::Result;
use async_trait::async_trait;

use crate::app::report_use_case::RunReport;
use crate::pipeline::processing::diagnostics::DiagnosticEntry;
use crate::types::CleanRecord;

/// Destination for the cleaned batch and its diagnostics
#[async_trait]
pub trait CleanOutputPort: Send + Sync {
    async fn write_clean_record(&self, record: &CleanRecord) -> Result<()>;

    async fn write_diagnostic(&self, entry: &DiagnosticEntry) -> Result<()>;

    /// Called once after the last record; buffered adapters persist here
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Destination for the aggregate reports of one run
#[async_trait]
pub trait ReportOutputPort: Send + Sync {
    async fn write_report(&self, report: &RunReport) -> Result<()>;
}
