use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::ports::ReportOutputPort;
use crate::pipeline::processing::aggregate::AggregateReport;
use crate::pipeline::{CleanStats, CleanedBatch, Pipeline};

/// Aggregate reports plus the run they were computed for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub stats: CleanStats,
    pub report: AggregateReport,
}

/// Use case for computing the reports over a cleaned batch
pub struct ReportUseCase<'a> {
    pipeline: &'a Pipeline,
    outputs: Vec<Box<dyn ReportOutputPort>>,
}

impl<'a> ReportUseCase<'a> {
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Self {
            pipeline,
            outputs: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: Box<dyn ReportOutputPort>) -> Self {
        self.outputs.push(output);
        self
    }

    pub async fn execute(&self, cleaned: &CleanedBatch) -> Result<RunReport> {
        let run_report = RunReport {
            run_id: cleaned.run_id,
            generated_at: Utc::now(),
            stats: cleaned.stats(),
            report: self.pipeline.report(cleaned),
        };

        for output in &self.outputs {
            output.write_report(&run_report).await?;
        }
        Ok(run_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ingestion::Ingestor;
    use crate::pipeline::storage::InMemoryStore;

    #[tokio::test]
    async fn test_report_reaches_every_output() {
        let first = InMemoryStore::new();
        let second = InMemoryStore::new();
        let pipeline = Pipeline::default();
        let cleaned = pipeline.clean(&Ingestor::demo_batch());

        let run_report = ReportUseCase::new(&pipeline)
            .with_output(Box::new(first.clone()))
            .with_output(Box::new(second.clone()))
            .execute(&cleaned)
            .await
            .unwrap();

        assert_eq!(run_report.run_id, cleaned.run_id);
        assert_eq!(first.reports().len(), 1);
        assert_eq!(second.reports().len(), 1);
        assert_eq!(first.reports()[0].report, run_report.report);
    }
}
