use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One order row exactly as ingested. Every field except the key is text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub order_id: i64,
    #[serde(deserialize_with = "nullable_text")]
    pub customer_name: String,
    #[serde(deserialize_with = "nullable_text")]
    pub email: String,
    #[serde(deserialize_with = "nullable_text")]
    pub order_date: String,
    #[serde(deserialize_with = "nullable_text")]
    pub amount: String,
    #[serde(deserialize_with = "nullable_text")]
    pub country: String,
}

impl RawRecord {
    pub fn new(
        order_id: i64,
        customer_name: &str,
        email: &str,
        order_date: &str,
        amount: &str,
        country: &str,
    ) -> Self {
        Self {
            order_id,
            customer_name: customer_name.to_string(),
            email: email.to_string(),
            order_date: order_date.to_string(),
            amount: amount.to_string(),
            country: country.to_string(),
        }
    }

    /// Raw text of a single field, used when reporting rejections
    pub fn field(&self, field: FieldName) -> &str {
        match field {
            FieldName::CustomerName => &self.customer_name,
            FieldName::Email => &self.email,
            FieldName::OrderDate => &self.order_date,
            FieldName::Amount => &self.amount,
            FieldName::Country => &self.country,
        }
    }
}

/// `null` is read as empty text; any other non-string value is a type mismatch.
fn nullable_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The validated derivative of exactly one `RawRecord`.
///
/// A field that failed validation is `None`; it is never replaced by a zero
/// or an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub order_id: i64,
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub country: Option<String>,
}

impl CleanRecord {
    /// A record carrying only the key; rules fill in the rest
    pub fn empty(order_id: i64) -> Self {
        Self {
            order_id,
            customer_name: None,
            email: None,
            order_date: None,
            amount: None,
            country: None,
        }
    }
}

/// Fields subject to normalization rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    CustomerName,
    Email,
    OrderDate,
    Amount,
    Country,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::CustomerName => "customer_name",
            FieldName::Email => "email",
            FieldName::OrderDate => "order_date",
            FieldName::Amount => "amount",
            FieldName::Country => "country",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was left absent during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    MissingName,
    MissingEmail,
    InvalidEmail,
    MissingAmount,
    InvalidAmount,
    NegativeAmount,
    MissingDate,
    InvalidDate,
    MissingCountry,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::MissingName => "MISSING_NAME",
            RejectionReason::MissingEmail => "MISSING_EMAIL",
            RejectionReason::InvalidEmail => "INVALID_EMAIL",
            RejectionReason::MissingAmount => "MISSING_AMOUNT",
            RejectionReason::InvalidAmount => "INVALID_AMOUNT",
            RejectionReason::NegativeAmount => "NEGATIVE_AMOUNT",
            RejectionReason::MissingDate => "MISSING_DATE",
            RejectionReason::InvalidDate => "INVALID_DATE",
            RejectionReason::MissingCountry => "MISSING_COUNTRY",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level rejection, keyed by order id and field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRejection {
    pub order_id: i64,
    pub field: FieldName,
    pub reason: RejectionReason,
    /// The input text that failed validation
    pub raw_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_reads_null_as_empty() {
        let record: RawRecord = serde_json::from_str(
            r#"{"order_id": 7, "customer_name": null, "email": "a@b.co",
                "order_date": "2023-07-10", "amount": "1", "country": "usa"}"#,
        )
        .unwrap();
        assert_eq!(record.customer_name, "");
        assert_eq!(record.email, "a@b.co");
    }

    #[test]
    fn test_raw_record_rejects_numeric_text_field() {
        let result: std::result::Result<RawRecord, _> = serde_json::from_str(
            r#"{"order_id": 7, "customer_name": "x", "email": "a@b.co",
                "order_date": "2023-07-10", "amount": 12.5, "country": "usa"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejection_reason_serializes_as_code() {
        let json = serde_json::to_string(&RejectionReason::NegativeAmount).unwrap();
        assert_eq!(json, "\"NEGATIVE_AMOUNT\"");
        assert_eq!(RejectionReason::InvalidDate.to_string(), "INVALID_DATE");
    }

    #[test]
    fn test_clean_record_amount_serializes_exactly() {
        let mut record = CleanRecord::empty(1);
        record.amount = Some(Decimal::new(10050, 2));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["amount"], "100.50");
        assert!(json["email"].is_null());
    }
}
