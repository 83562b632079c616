use crate::app::ports::CleanOutputPort;
use crate::constants::{CLEAN_RECORDS_FILE, DIAGNOSTICS_FILE};
use crate::pipeline::processing::diagnostics::DiagnosticEntry;
use crate::types::CleanRecord;
use anyhow::anyhow;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// File-based implementation of CleanOutputPort.
/// Writes cleaned records and diagnostics to two NDJSON files in one directory.
pub struct NdjsonOutputAdapter {
    records_writer: Mutex<BufWriter<File>>,
    diagnostics_writer: Mutex<BufWriter<File>>,
    records_path: PathBuf,
    diagnostics_path: PathBuf,
}

impl NdjsonOutputAdapter {
    pub fn new(out_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(out_dir)?;

        let records_path = out_dir.join(CLEAN_RECORDS_FILE);
        let diagnostics_path = out_dir.join(DIAGNOSTICS_FILE);

        info!("Creating clean output files:");
        info!("  Records: {}", records_path.display());
        info!("  Diagnostics: {}", diagnostics_path.display());

        Ok(Self {
            records_writer: Mutex::new(open_truncated(&records_path)?),
            diagnostics_writer: Mutex::new(open_truncated(&diagnostics_path)?),
            records_path,
            diagnostics_path,
        })
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn diagnostics_path(&self) -> &Path {
        &self.diagnostics_path
    }
}

fn open_truncated(path: &Path) -> anyhow::Result<BufWriter<File>> {
    Ok(BufWriter::new(
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?,
    ))
}

fn write_line<T: serde::Serialize>(writer: &Mutex<BufWriter<File>>, value: &T) -> anyhow::Result<()> {
    let json_line = serde_json::to_string(value)?;
    let mut writer = writer
        .lock()
        .map_err(|_| anyhow!("output writer lock poisoned"))?;
    writeln!(writer, "{}", json_line)?;
    Ok(())
}

#[async_trait::async_trait]
impl CleanOutputPort for NdjsonOutputAdapter {
    async fn write_clean_record(&self, record: &CleanRecord) -> anyhow::Result<()> {
        write_line(&self.records_writer, record)
    }

    async fn write_diagnostic(&self, entry: &DiagnosticEntry) -> anyhow::Result<()> {
        write_line(&self.diagnostics_writer, entry)
    }

    async fn flush(&self) -> anyhow::Result<()> {
        for writer in [&self.records_writer, &self.diagnostics_writer] {
            writer
                .lock()
                .map_err(|_| anyhow!("output writer lock poisoned"))?
                .flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = NdjsonOutputAdapter::new(dir.path()).unwrap();

        let mut record = CleanRecord::empty(1001);
        record.country = Some("Canada".to_string());
        adapter.write_clean_record(&record).await.unwrap();
        adapter.write_clean_record(&CleanRecord::empty(1002)).await.unwrap();
        adapter
            .write_diagnostic(&DiagnosticEntry::UnusedOverride { order_id: 5 })
            .await
            .unwrap();
        adapter.flush().await.unwrap();

        let records = std::fs::read_to_string(adapter.records_path()).unwrap();
        let lines: Vec<&str> = records.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: CleanRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, record);

        let diagnostics = std::fs::read_to_string(adapter.diagnostics_path()).unwrap();
        assert_eq!(diagnostics.lines().count(), 1);
    }
}
