use super::FieldRule;
use crate::types::{CleanRecord, FieldName, RawRecord, RejectionReason};

/// Trim, then upper-case the first character and lower-case the rest.
///
/// This is deliberately not per-word title case: "JANE SMITH" becomes
/// "Jane smith".
pub fn normalize_name(text: &str) -> Result<String, RejectionReason> {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => Err(RejectionReason::MissingName),
        Some(first) => Ok(first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect()),
    }
}

pub struct NameRule;

impl FieldRule for NameRule {
    fn field(&self) -> FieldName {
        FieldName::CustomerName
    }

    fn name(&self) -> &str {
        "customer_name_casing"
    }

    fn apply(&self, raw: &RawRecord, clean: &mut CleanRecord) -> Result<(), RejectionReason> {
        clean.customer_name = Some(normalize_name(&raw.customer_name)?);
        Ok(())
    }
}
