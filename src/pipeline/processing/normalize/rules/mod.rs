// Per-field validation and canonicalization rules

pub mod amount;
pub mod country;
pub mod date;
pub mod email;
pub mod name;

use crate::types::{CleanRecord, FieldName, RawRecord, RejectionReason};

pub use amount::{parse_amount, AmountRule};
pub use country::{CountryRule, CountryTable};
pub use date::DateRule;
pub use email::{validate_email, EmailRule};
pub use name::{normalize_name, NameRule};

/// A single field-level rule.
///
/// A rule reads its field from the raw record and either writes the cleaned
/// value into `clean` or leaves it absent and returns the rejection reason.
/// Rules never look at other fields.
pub trait FieldRule: Send + Sync {
    /// The field this rule owns
    fn field(&self) -> FieldName;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;

    fn apply(&self, raw: &RawRecord, clean: &mut CleanRecord) -> Result<(), RejectionReason>;
}
