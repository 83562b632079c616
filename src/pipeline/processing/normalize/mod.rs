use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::pipeline::ingestion::RawBatch;
use crate::types::{CleanRecord, FieldName, FieldRejection, RawRecord, RejectionReason};

pub mod registry;
pub mod rules;

pub use registry::RuleRegistry;

/// The cleaned form of one raw record together with the reasons any of its
/// fields were left absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub record: CleanRecord,
    /// Empty when every field passed validation
    pub rejections: Vec<FieldRejection>,
}

impl NormalizedRecord {
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }

    pub fn rejection_for(&self, field: FieldName) -> Option<RejectionReason> {
        self.rejections
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.reason)
    }
}

/// Trait for turning raw records into cleaned records.
///
/// Normalization never fails: a bad field becomes absent and is annotated,
/// and every raw record yields exactly one cleaned record.
pub trait Normalizer {
    fn normalize(&self, record: &RawRecord) -> NormalizedRecord;

    fn normalize_batch(&self, batch: &RawBatch) -> Vec<NormalizedRecord> {
        batch.iter().map(|record| self.normalize(record)).collect()
    }
}

/// Normalizer backed by the rule registry
pub struct DefaultNormalizer {
    registry: RuleRegistry,
}

impl DefaultNormalizer {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(RuleRegistry::from_config(config))
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new(RuleRegistry::default())
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, record: &RawRecord) -> NormalizedRecord {
        let normalized = self.registry.apply(record);
        if !normalized.is_clean() {
            debug!(
                order_id = record.order_id,
                rejections = normalized.rejections.len(),
                "Record normalized with rejected fields"
            );
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ingestion::Ingestor;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_normalize_clean_record() {
        let normalizer = DefaultNormalizer::default();
        let raw = RawRecord::new(1001, "john doe", "John.Doe@Example.com", "2023-07-10", "100.50", "usa");

        let normalized = normalizer.normalize(&raw);

        assert!(normalized.is_clean());
        let record = normalized.record;
        assert_eq!(record.order_id, 1001);
        assert_eq!(record.customer_name.as_deref(), Some("John doe"));
        assert_eq!(record.email.as_deref(), Some("john.doe@example.com"));
        assert_eq!(record.order_date, NaiveDate::from_ymd_opt(2023, 7, 10));
        assert_eq!(record.amount, Some(Decimal::new(10050, 2)));
        assert_eq!(record.country.as_deref(), Some("United States"));
    }

    #[test]
    fn test_bad_fields_are_isolated() {
        let normalizer = DefaultNormalizer::default();
        let raw = RawRecord::new(1004, "Robert Brown", "robert@example", "14-07-2023", "-25.00", "CANADA");

        let normalized = normalizer.normalize(&raw);

        assert_eq!(normalized.rejections.len(), 2);
        assert_eq!(normalized.rejection_for(FieldName::Email), Some(RejectionReason::InvalidEmail));
        assert_eq!(normalized.rejection_for(FieldName::Amount), Some(RejectionReason::NegativeAmount));
        assert_eq!(normalized.record.email, None);
        assert_eq!(normalized.record.amount, None);
        assert_eq!(normalized.record.order_date, NaiveDate::from_ymd_opt(2023, 7, 14));
        assert_eq!(normalized.record.country.as_deref(), Some("Canada"));
    }

    #[test]
    fn test_one_clean_record_per_raw_record() {
        let normalizer = DefaultNormalizer::default();
        let batch = Ingestor::demo_batch();

        let normalized = normalizer.normalize_batch(&batch);

        assert_eq!(normalized.len(), batch.len());
        for (raw, clean) in batch.iter().zip(&normalized) {
            assert_eq!(raw.order_id, clean.record.order_id);
        }
    }

    #[test]
    fn test_custom_config_changes_date_formats() {
        let mut config = Config::default();
        config.normalize.date_formats = vec!["%d.%m.%Y".to_string()];
        let normalizer = DefaultNormalizer::from_config(&config);

        let raw = RawRecord::new(1, "a", "a@b.co", "10.07.2023", "1", "usa");
        let normalized = normalizer.normalize(&raw);
        assert_eq!(normalized.record.order_date, NaiveDate::from_ymd_opt(2023, 7, 10));

        let raw = RawRecord::new(2, "a", "a@b.co", "2023-07-10", "1", "usa");
        assert_eq!(
            normalizer.normalize(&raw).rejection_for(FieldName::OrderDate),
            Some(RejectionReason::InvalidDate)
        );
    }
}
