// Data processing pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod processing;
pub mod storage;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::observability::metrics;
use crate::types::CleanRecord;
use ingestion::RawBatch;
use processing::aggregate::{AggregateReport, Aggregator};
use processing::diagnostics::{find_duplicate_ids, Diagnostics};
use processing::normalize::{DefaultNormalizer, NormalizedRecord, Normalizer};
use processing::overrides::DateOverrides;

/// Output of the cleaning stages for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanedBatch {
    pub run_id: Uuid,
    pub normalized: Vec<NormalizedRecord>,
    pub diagnostics: Diagnostics,
}

/// Counts describing one cleaned batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanStats {
    pub total_records: usize,
    pub fully_clean: usize,
    pub with_rejections: usize,
    pub rejected_fields: usize,
    pub duplicate_groups: usize,
    pub overrides_applied: usize,
    pub unused_overrides: usize,
}

impl CleanedBatch {
    pub fn records(&self) -> impl Iterator<Item = &CleanRecord> {
        self.normalized.iter().map(|n| &n.record)
    }

    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    pub fn stats(&self) -> CleanStats {
        let fully_clean = self.normalized.iter().filter(|n| n.is_clean()).count();
        CleanStats {
            total_records: self.normalized.len(),
            fully_clean,
            with_rejections: self.normalized.len() - fully_clean,
            rejected_fields: self.diagnostics.rejections.len(),
            duplicate_groups: self.diagnostics.duplicates.len(),
            overrides_applied: self.diagnostics.overrides.applied.len(),
            unused_overrides: self.diagnostics.overrides.unused.len(),
        }
    }
}

/// Ingested batch -> normalized records -> overrides -> diagnostics -> reports
pub struct Pipeline {
    normalizer: Box<dyn Normalizer + Send + Sync>,
    overrides: DateOverrides,
    aggregator: Aggregator,
}

impl Pipeline {
    pub fn new(
        normalizer: Box<dyn Normalizer + Send + Sync>,
        overrides: DateOverrides,
        aggregator: Aggregator,
    ) -> Self {
        Self {
            normalizer,
            overrides,
            aggregator,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(DefaultNormalizer::from_config(config)),
            DateOverrides::new(&config.date_overrides),
            Aggregator::new(config.report.top_customers),
        )
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Normalize every record, apply the date overrides and collect diagnostics
    pub fn clean(&self, batch: &RawBatch) -> CleanedBatch {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("clean_batch", %run_id, records = batch.len());
        let _enter = span.enter();

        let duplicates = find_duplicate_ids(batch);
        for group in &duplicates {
            warn!(order_id = group.order_id, count = group.count, "Duplicate order id in batch");
        }
        metrics::diagnostics::duplicates_found(duplicates.len());

        let mut normalized = self.normalizer.normalize_batch(batch);
        let outcome = self.overrides.apply(&mut normalized);

        for record in &normalized {
            metrics::normalize::record_normalized(record.is_clean());
            for rejection in &record.rejections {
                metrics::normalize::rejection(rejection.field, rejection.reason);
            }
        }
        metrics::normalize::batch_processed(batch.len());

        let diagnostics = Diagnostics::collect(&normalized, duplicates, outcome);
        let cleaned = CleanedBatch {
            run_id,
            normalized,
            diagnostics,
        };

        let stats = cleaned.stats();
        info!(
            total = stats.total_records,
            clean = stats.fully_clean,
            rejected_fields = stats.rejected_fields,
            overrides = stats.overrides_applied,
            "Batch cleaned"
        );
        cleaned
    }

    pub fn report(&self, cleaned: &CleanedBatch) -> AggregateReport {
        let report = self.aggregator.aggregate(cleaned.records());

        metrics::aggregate::report_built(
            report.summary.total_revenue.to_f64().unwrap_or(0.0),
            report.by_country.len(),
        );
        info!(
            run_id = %cleaned.run_id,
            revenue = %report.summary.total_revenue,
            countries = report.by_country.len(),
            days = report.by_date.len(),
            "Aggregate report built"
        );
        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
