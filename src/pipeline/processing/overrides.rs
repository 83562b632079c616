// Second-phase date corrections.
//
// Automatic parsing leaves unrecognized dates absent. A reviewer then lists
// the correct date per order id, and that list is applied here. The list is
// data, not a rule: it names specific orders and never generalizes.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DateOverrideEntry;
use crate::pipeline::processing::normalize::NormalizedRecord;
use crate::types::FieldName;

/// One override that changed a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideApplication {
    pub order_id: i64,
    /// The automatically parsed date, if there was one
    pub previous: Option<NaiveDate>,
    pub applied: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideOutcome {
    pub applied: Vec<OverrideApplication>,
    /// Override order ids with no matching record in the batch
    pub unused: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct DateOverrides {
    entries: BTreeMap<i64, NaiveDate>,
}

impl DateOverrides {
    pub fn new(entries: &[DateOverrideEntry]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|entry| (entry.order_id, entry.order_date))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, order_id: i64) -> Option<NaiveDate> {
        self.entries.get(&order_id).copied()
    }

    /// Apply every override to the matching records in place.
    ///
    /// A listed record takes the override date and loses its date rejection.
    /// Every record sharing a listed order id is corrected.
    pub fn apply(&self, records: &mut [NormalizedRecord]) -> OverrideOutcome {
        let mut outcome = OverrideOutcome::default();
        if self.entries.is_empty() {
            return outcome;
        }

        let mut matched = HashSet::new();
        for normalized in records.iter_mut() {
            let order_id = normalized.record.order_id;
            let Some(date) = self.get(order_id) else {
                continue;
            };
            matched.insert(order_id);

            let previous = normalized.record.order_date.replace(date);
            normalized
                .rejections
                .retain(|rejection| rejection.field != FieldName::OrderDate);

            info!(order_id, applied = %date, "Applied date override");
            crate::observability::metrics::normalize::override_applied();
            outcome.applied.push(OverrideApplication {
                order_id,
                previous,
                applied: date,
            });
        }

        for order_id in self.entries.keys() {
            if !matched.contains(order_id) {
                warn!(order_id, "Date override matches no record in the batch");
                outcome.unused.push(*order_id);
            }
        }

        outcome
    }
}
