//! Metrics for the order cleaning pipeline
//!
//! Recording goes through the `metrics` facade. `init` installs a Prometheus
//! recorder; without it every call below is a no-op, which is what library
//! users and unit tests get.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Ingest metrics
    IngestBatches,
    IngestRecords,

    // Normalize metrics
    NormalizeRecords,
    NormalizeCleanRecords,
    NormalizeRejections,
    NormalizeOverridesApplied,
    NormalizeBatchSize,

    // Diagnostics metrics
    DiagnosticsDuplicateGroups,

    // Aggregate metrics
    AggregateReports,
    AggregateRevenue,
    AggregateCountryGroups,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::IngestBatches => "oc_ingest_batches_total",
            MetricName::IngestRecords => "oc_ingest_records_total",

            MetricName::NormalizeRecords => "oc_normalize_records_total",
            MetricName::NormalizeCleanRecords => "oc_normalize_clean_records_total",
            MetricName::NormalizeRejections => "oc_normalize_rejections_total",
            MetricName::NormalizeOverridesApplied => "oc_overrides_applied_total",
            MetricName::NormalizeBatchSize => "oc_normalize_batch_size",

            MetricName::DiagnosticsDuplicateGroups => "oc_diagnostics_duplicate_groups",

            MetricName::AggregateReports => "oc_aggregate_reports_total",
            MetricName::AggregateRevenue => "oc_aggregate_revenue",
            MetricName::AggregateCountryGroups => "oc_aggregate_country_groups",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is harmless.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();

    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus exposition text for everything recorded so far
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod ingest {
    use super::MetricName;

    pub fn batch_ingested(records: usize) {
        ::metrics::counter!(MetricName::IngestBatches.as_str()).increment(1);
        ::metrics::counter!(MetricName::IngestRecords.as_str()).increment(records as u64);
    }
}

pub mod normalize {
    use super::MetricName;
    use crate::types::{FieldName, RejectionReason};

    /// Record that a record went through the rule set
    pub fn record_normalized(clean: bool) {
        ::metrics::counter!(MetricName::NormalizeRecords.as_str()).increment(1);
        if clean {
            ::metrics::counter!(MetricName::NormalizeCleanRecords.as_str()).increment(1);
        }
    }

    /// Record a field left absent, labelled by field and reason code
    pub fn rejection(field: FieldName, reason: RejectionReason) {
        ::metrics::counter!(
            MetricName::NormalizeRejections.as_str(),
            "field" => field.as_str(),
            "reason" => reason.as_str()
        )
        .increment(1);
    }

    pub fn override_applied() {
        ::metrics::counter!(MetricName::NormalizeOverridesApplied.as_str()).increment(1);
    }

    pub fn batch_processed(batch_size: usize) {
        ::metrics::histogram!(MetricName::NormalizeBatchSize.as_str()).record(batch_size as f64);
    }
}

pub mod diagnostics {
    use super::MetricName;

    pub fn duplicates_found(groups: usize) {
        ::metrics::gauge!(MetricName::DiagnosticsDuplicateGroups.as_str()).set(groups as f64);
    }
}

pub mod aggregate {
    use super::MetricName;

    pub fn report_built(revenue: f64, country_groups: usize) {
        ::metrics::counter!(MetricName::AggregateReports.as_str()).increment(1);
        ::metrics::gauge!(MetricName::AggregateRevenue.as_str()).set(revenue);
        ::metrics::gauge!(MetricName::AggregateCountryGroups.as_str()).set(country_groups as f64);
    }
}
