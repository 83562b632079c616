use once_cell::sync::Lazy;
use regex::Regex;

use super::FieldRule;
use crate::types::{CleanRecord, FieldName, RawRecord, RejectionReason};

// local-part @ label(.label)* . tld, where labels cannot be empty so the
// domain never starts or ends with a dot
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Validate an email address, returning its lowercase form
pub fn validate_email(text: &str) -> Result<String, RejectionReason> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RejectionReason::MissingEmail);
    }
    if !EMAIL_PATTERN.is_match(trimmed) {
        return Err(RejectionReason::InvalidEmail);
    }
    Ok(trimmed.to_lowercase())
}

pub struct EmailRule;

impl FieldRule for EmailRule {
    fn field(&self) -> FieldName {
        FieldName::Email
    }

    fn name(&self) -> &str {
        "email_format"
    }

    fn apply(&self, raw: &RawRecord, clean: &mut CleanRecord) -> Result<(), RejectionReason> {
        clean.email = Some(validate_email(&raw.email)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_address() {
        assert_eq!(
            validate_email("john.doe@example.com"),
            Ok("john.doe@example.com".to_string())
        );
    }

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(
            validate_email("  SARAH.KIM@EXAMPLE.COM "),
            Ok("sarah.kim@example.com".to_string())
        );
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for bad in [
            "ana.lopez@@example.com",
            "robert@example",
            "@example.com",
            "user@.example.com",
            "user@example.com.",
            "user@example.c",
            "user name@example.com",
        ] {
            assert_eq!(validate_email(bad), Err(RejectionReason::InvalidEmail), "{}", bad);
        }
    }

    #[test]
    fn test_empty_is_missing() {
        assert_eq!(validate_email(""), Err(RejectionReason::MissingEmail));
        assert_eq!(validate_email("   "), Err(RejectionReason::MissingEmail));
    }

    #[test]
    fn test_rule_leaves_field_absent_on_failure() {
        let raw = RawRecord::new(1, "a", "robert@example", "", "", "");
        let mut clean = CleanRecord::empty(1);

        assert_eq!(EmailRule.apply(&raw, &mut clean), Err(RejectionReason::InvalidEmail));
        assert_eq!(clean.email, None);
    }
}
