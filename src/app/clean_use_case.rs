use anyhow::Result;
use tracing::info;

use crate::app::ports::CleanOutputPort;
use crate::pipeline::ingestion::RawBatch;
use crate::pipeline::{CleanedBatch, Pipeline};

/// Use case for cleaning a raw batch and emitting records plus diagnostics
pub struct CleanUseCase<'a> {
    pipeline: &'a Pipeline,
    output: Box<dyn CleanOutputPort>,
}

impl<'a> CleanUseCase<'a> {
    pub fn new(pipeline: &'a Pipeline, output: Box<dyn CleanOutputPort>) -> Self {
        Self { pipeline, output }
    }

    /// Clean the batch and write every record and diagnostic to the output
    pub async fn execute(&self, batch: &RawBatch) -> Result<CleanedBatch> {
        let cleaned = self.pipeline.clean(batch);

        for record in cleaned.records() {
            self.output.write_clean_record(record).await?;
        }

        let entries = cleaned.diagnostics.entries();
        for entry in &entries {
            self.output.write_diagnostic(entry).await?;
        }
        self.output.flush().await?;

        info!(
            run_id = %cleaned.run_id,
            records = cleaned.len(),
            diagnostics = entries.len(),
            "Clean output written"
        );
        Ok(cleaned)
    }
}
