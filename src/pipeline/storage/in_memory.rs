use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::app::ports::{CleanOutputPort, ReportOutputPort};
use crate::app::report_use_case::RunReport;
use crate::pipeline::processing::diagnostics::DiagnosticEntry;
use crate::types::CleanRecord;

#[derive(Default)]
struct Inner {
    clean_records: Vec<CleanRecord>,
    diagnostics: Vec<DiagnosticEntry>,
    reports: Vec<RunReport>,
    flushes: usize,
}

/// In-memory sink for every pipeline output.
///
/// Clones share the same storage, so a caller can keep one handle and give
/// another to a use case.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clean_records(&self) -> Vec<CleanRecord> {
        self.lock().clean_records.clone()
    }

    pub fn diagnostics(&self) -> Vec<DiagnosticEntry> {
        self.lock().diagnostics.clone()
    }

    pub fn reports(&self) -> Vec<RunReport> {
        self.lock().reports.clone()
    }

    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning is ignored; stored data stays readable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CleanOutputPort for InMemoryStore {
    async fn write_clean_record(&self, record: &CleanRecord) -> Result<()> {
        self.lock().clean_records.push(record.clone());
        debug!(order_id = record.order_id, "Stored clean record");
        Ok(())
    }

    async fn write_diagnostic(&self, entry: &DiagnosticEntry) -> Result<()> {
        self.lock().diagnostics.push(entry.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }
}

#[async_trait]
impl ReportOutputPort for InMemoryStore {
    async fn write_report(&self, report: &RunReport) -> Result<()> {
        self.lock().reports.push(report.clone());
        Ok(())
    }
}
