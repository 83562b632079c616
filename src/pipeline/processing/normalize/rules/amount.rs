use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::FieldRule;
use crate::types::{CleanRecord, FieldName, RawRecord, RejectionReason};

/// Cleaned amounts always carry exactly this many fractional digits
pub const AMOUNT_SCALE: u32 = 2;

/// Largest accepted amount (one quadrillion). Anything above is
/// `INVALID_AMOUNT`, which keeps batch totals far from `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("amount pattern is valid"));

/// Parse a non-negative amount with at most two fractional digits into an
/// exact fixed-point value.
pub fn parse_amount(text: &str) -> Result<Decimal, RejectionReason> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RejectionReason::MissingAmount);
    }

    if let Some(magnitude) = trimmed.strip_prefix('-') {
        return if AMOUNT_PATTERN.is_match(magnitude.trim_start()) {
            Err(RejectionReason::NegativeAmount)
        } else {
            Err(RejectionReason::InvalidAmount)
        };
    }

    if !AMOUNT_PATTERN.is_match(trimmed) {
        return Err(RejectionReason::InvalidAmount);
    }

    let mut value = Decimal::from_str_exact(trimmed).map_err(|_| RejectionReason::InvalidAmount)?;
    if value > MAX_AMOUNT {
        return Err(RejectionReason::InvalidAmount);
    }

    // rescale silently keeps a smaller scale when the mantissa has no room
    value.rescale(AMOUNT_SCALE);
    if value.scale() != AMOUNT_SCALE {
        return Err(RejectionReason::InvalidAmount);
    }
    Ok(value)
}

pub struct AmountRule;

impl FieldRule for AmountRule {
    fn field(&self) -> FieldName {
        FieldName::Amount
    }

    fn name(&self) -> &str {
        "amount_fixed_point"
    }

    fn apply(&self, raw: &RawRecord, clean: &mut CleanRecord) -> Result<(), RejectionReason> {
        clean.amount = Some(parse_amount(&raw.amount)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_two_decimal_places() {
        let value = parse_amount("100.50").unwrap();
        assert_eq!(value, Decimal::new(10050, 2));
        assert_eq!(value.to_string(), "100.50");
    }

    #[test]
    fn test_integer_gains_scale() {
        let value = parse_amount("42").unwrap();
        assert_eq!(value, Decimal::new(4200, 2));
        assert_eq!(value.to_string(), "42.00");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(parse_amount(" 7.5 ").unwrap().to_string(), "7.50");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse_amount("one hundred"), Err(RejectionReason::InvalidAmount));
        assert_eq!(parse_amount("-25.00"), Err(RejectionReason::NegativeAmount));
        assert_eq!(parse_amount(""), Err(RejectionReason::MissingAmount));
        assert_eq!(parse_amount("1.234"), Err(RejectionReason::InvalidAmount));
        assert_eq!(parse_amount("+5"), Err(RejectionReason::InvalidAmount));
        assert_eq!(parse_amount("-abc"), Err(RejectionReason::InvalidAmount));
        assert_eq!(parse_amount("$10"), Err(RejectionReason::InvalidAmount));
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000_000, 0));
        assert_eq!(
            parse_amount("1000000000000000.00").unwrap().to_string(),
            "1000000000000000.00"
        );
        assert_eq!(parse_amount("1000000000000000.01"), Err(RejectionReason::InvalidAmount));
    }

    #[test]
    fn test_oversized_amounts_are_invalid() {
        // 28 digits would only fit at scale 1, 29 digits only at scale 0
        assert_eq!(
            parse_amount("1234567890123456789012345678"),
            Err(RejectionReason::InvalidAmount)
        );
        assert_eq!(
            parse_amount("79228162514264337593543950335"),
            Err(RejectionReason::InvalidAmount)
        );
        // Not representable at all
        assert_eq!(
            parse_amount("99999999999999999999999999999999"),
            Err(RejectionReason::InvalidAmount)
        );
    }

    #[test]
    fn test_accepted_amounts_always_have_two_places() {
        for input in ["0", "1", "999999999999999", "123456789.5", "0.07"] {
            assert_eq!(parse_amount(input).unwrap().scale(), AMOUNT_SCALE, "{}", input);
        }
    }

    #[test]
    fn test_reparsing_cleaned_text_is_stable() {
        for input in ["100.50", "42", "0", "0.5", "300.00"] {
            let first = parse_amount(input).unwrap();
            let second = parse_amount(&first.to_string()).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.to_string(), second.to_string());
        }
    }
}
