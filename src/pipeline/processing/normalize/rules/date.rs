use chrono::NaiveDate;
use regex::Regex;

use super::FieldRule;
use crate::constants::DEFAULT_DATE_FORMATS;
use crate::types::{CleanRecord, FieldName, RawRecord, RejectionReason};

/// Tries each known date format in priority order and takes the first match.
///
/// Input that no format accepts is rejected rather than guessed; those rows
/// are fixed afterwards through the override list.
///
/// chrono alone accepts a `%Y` of any width, so each format also carries a
/// digit-width pattern the input must match: `%Y` takes exactly four digits,
/// `%m` and `%d` one or two.
pub struct DateRule {
    formats: Vec<String>,
    shapes: Vec<Option<Regex>>,
}

/// Anchored regex describing the text a chrono format may consume
fn shape_of(format: &str) -> Option<Regex> {
    let mut pattern = String::from("^");
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            pattern.push_str(&regex::escape(&c.to_string()));
            continue;
        }
        match chars.next() {
            Some('Y') => pattern.push_str("[0-9]{4}"),
            Some('y') => pattern.push_str("[0-9]{2}"),
            Some('m') | Some('d') => pattern.push_str("[0-9]{1,2}"),
            Some('%') => pattern.push('%'),
            // Other specifiers are left to chrono
            Some(_) => pattern.push_str(".+?"),
            None => return None,
        }
    }
    pattern.push('$');
    Regex::new(&pattern).ok()
}

impl DateRule {
    pub fn new(formats: Vec<String>) -> Self {
        let shapes = formats.iter().map(|f| shape_of(f)).collect();
        Self { formats, shapes }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn parse(&self, text: &str) -> Result<NaiveDate, RejectionReason> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RejectionReason::MissingDate);
        }

        self.formats
            .iter()
            .zip(&self.shapes)
            .filter(|(_, shape)| shape.as_ref().map_or(true, |re| re.is_match(trimmed)))
            .find_map(|(format, _)| NaiveDate::parse_from_str(trimmed, format).ok())
            .ok_or(RejectionReason::InvalidDate)
    }
}

impl Default for DateRule {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }
}

impl FieldRule for DateRule {
    fn field(&self) -> FieldName {
        FieldName::OrderDate
    }

    fn name(&self) -> &str {
        "order_date_formats"
    }

    fn apply(&self, raw: &RawRecord, clean: &mut CleanRecord) -> Result<(), RejectionReason> {
        clean.order_date = Some(self.parse(&raw.order_date)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_formats() {
        let rule = DateRule::default();
        assert_eq!(rule.parse("2023-07-10"), Ok(ymd(2023, 7, 10)));
        assert_eq!(rule.parse("07/11/2023"), Ok(ymd(2023, 7, 11)));
        assert_eq!(rule.parse("2023/07/12"), Ok(ymd(2023, 7, 12)));
        assert_eq!(rule.parse("14-07-2023"), Ok(ymd(2023, 7, 14)));
    }

    #[test]
    fn test_month_thirteen_is_invalid() {
        let rule = DateRule::default();
        assert_eq!(rule.parse("2023-13-07"), Err(RejectionReason::InvalidDate));
    }

    #[test]
    fn test_garbage_and_empty() {
        let rule = DateRule::default();
        assert_eq!(rule.parse("next tuesday"), Err(RejectionReason::InvalidDate));
        assert_eq!(rule.parse("02/30/2023"), Err(RejectionReason::InvalidDate));
        assert_eq!(rule.parse("  "), Err(RejectionReason::MissingDate));
    }

    #[test]
    fn test_short_years_are_not_guessed() {
        let rule = DateRule::default();
        for input in ["10-07-23", "7/4/23", "23-7-4", "023-07-10", "20230-07-10", "07/11/02023"] {
            assert_eq!(rule.parse(input), Err(RejectionReason::InvalidDate), "{}", input);
        }
    }

    #[test]
    fn test_single_digit_month_and_day_accepted() {
        let rule = DateRule::default();
        assert_eq!(rule.parse("7/4/2023"), Ok(ymd(2023, 7, 4)));
        assert_eq!(rule.parse("2023-7-4"), Ok(ymd(2023, 7, 4)));
        assert_eq!(rule.parse("2023-007-04"), Err(RejectionReason::InvalidDate));
    }

    #[test]
    fn test_two_digit_year_format_when_configured() {
        let rule = DateRule::new(vec!["%d-%m-%y".into()]);
        assert_eq!(rule.parse("10-07-23"), Ok(ymd(2023, 7, 10)));
        assert_eq!(rule.parse("10-07-2023"), Err(RejectionReason::InvalidDate));
    }

    #[test]
    fn test_priority_order_decides_between_formats() {
        // Both readings are valid; the first configured format wins
        let us_first = DateRule::new(vec!["%m/%d/%Y".into(), "%d/%m/%Y".into()]);
        let eu_first = DateRule::new(vec!["%d/%m/%Y".into(), "%m/%d/%Y".into()]);

        assert_eq!(us_first.parse("03/04/2023"), Ok(ymd(2023, 3, 4)));
        assert_eq!(eu_first.parse("03/04/2023"), Ok(ymd(2023, 4, 3)));
    }
}
