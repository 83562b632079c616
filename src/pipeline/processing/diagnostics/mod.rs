use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pipeline::ingestion::RawBatch;
use crate::pipeline::processing::normalize::NormalizedRecord;
use crate::pipeline::processing::overrides::{OverrideApplication, OverrideOutcome};
use crate::types::{FieldName, FieldRejection, RejectionReason};

/// An order id that occurs more than once in a raw batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub order_id: i64,
    pub count: usize,
    /// Zero-based positions of the records within the batch
    pub positions: Vec<usize>,
}

/// Report every order id appearing more than once, sorted by id.
///
/// Duplicates are surfaced only; choosing which record is right is left to a
/// person.
pub fn find_duplicate_ids(batch: &RawBatch) -> Vec<DuplicateGroup> {
    let mut positions: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (index, record) in batch.iter().enumerate() {
        positions.entry(record.order_id).or_default().push(index);
    }

    positions
        .into_iter()
        .filter(|(_, seen)| seen.len() > 1)
        .map(|(order_id, seen)| DuplicateGroup {
            order_id,
            count: seen.len(),
            positions: seen,
        })
        .collect()
}

/// One line of the diagnostics output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticEntry {
    Rejection(FieldRejection),
    Duplicate(DuplicateGroup),
    OverrideApplied(OverrideApplication),
    UnusedOverride { order_id: i64 },
}

/// Everything the pipeline flagged but did not resolve for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rejections: Vec<FieldRejection>,
    pub duplicates: Vec<DuplicateGroup>,
    pub overrides: OverrideOutcome,
}

impl Diagnostics {
    pub fn collect(
        normalized: &[NormalizedRecord],
        duplicates: Vec<DuplicateGroup>,
        overrides: OverrideOutcome,
    ) -> Self {
        let rejections = normalized
            .iter()
            .flat_map(|n| n.rejections.iter().cloned())
            .collect();
        Self {
            rejections,
            duplicates,
            overrides,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rejections.is_empty()
            && self.duplicates.is_empty()
            && self.overrides.applied.is_empty()
            && self.overrides.unused.is_empty()
    }

    pub fn rejections_for(&self, order_id: i64) -> Vec<&FieldRejection> {
        self.rejections
            .iter()
            .filter(|r| r.order_id == order_id)
            .collect()
    }

    pub fn count_by_reason(&self) -> BTreeMap<RejectionReason, usize> {
        let mut counts = BTreeMap::new();
        for rejection in &self.rejections {
            *counts.entry(rejection.reason).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_by_field(&self) -> BTreeMap<FieldName, usize> {
        let mut counts = BTreeMap::new();
        for rejection in &self.rejections {
            *counts.entry(rejection.field).or_insert(0) += 1;
        }
        counts
    }

    /// Flatten into output lines: rejections, then duplicates, then overrides
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        let mut entries: Vec<DiagnosticEntry> = self
            .rejections
            .iter()
            .cloned()
            .map(DiagnosticEntry::Rejection)
            .collect();
        entries.extend(self.duplicates.iter().cloned().map(DiagnosticEntry::Duplicate));
        entries.extend(
            self.overrides
                .applied
                .iter()
                .cloned()
                .map(DiagnosticEntry::OverrideApplied),
        );
        entries.extend(
            self.overrides
                .unused
                .iter()
                .map(|order_id| DiagnosticEntry::UnusedOverride { order_id: *order_id }),
        );
        entries
    }
}
