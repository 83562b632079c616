use super::RawBatch;
use crate::types::RawRecord;

/// Ten demonstration orders seeded with the usual dirty-data problems:
/// malformed emails, mixed date formats, non-numeric and negative amounts,
/// and inconsistent country spellings.
pub fn demo_batch() -> RawBatch {
    RawBatch::new(vec![
        RawRecord::new(1001, "john doe", "John.Doe@Example.com", "2023-07-10", "100.50", "usa"),
        RawRecord::new(1002, "JANE SMITH", "jane.smith@example.com", "07/11/2023", "200", "US"),
        RawRecord::new(1003, "ana lopez", "ana.lopez@@example.com", "2023/07/12", "one hundred", "México"),
        RawRecord::new(1004, "Robert Brown", "robert@example", "14-07-2023", "-25.00", "CANADA"),
        RawRecord::new(1005, "  emily davis ", "", "2023-13-07", "75.25", "U.S.A."),
        RawRecord::new(1006, "michael lee", "michael.lee@example.com", "2023-07-15", "", "canada"),
        RawRecord::new(1007, "sarah kim", "SARAH.KIM@EXAMPLE.COM", "07/16/2023", "300.00", "United States"),
        RawRecord::new(1008, "carlos ruiz", "carlos.ruiz@example.mx", "16-07-2023", "150.75", "mexico"),
        RawRecord::new(1009, "", "no.name@example.com", "2023/07/18", "42", "brazil"),
        RawRecord::new(1010, "John Doe", "john.doe@example.com", "2023-07-10", "80", "usa"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_batch_has_unique_keys() {
        let batch = demo_batch();
        let ids: HashSet<i64> = batch.iter().map(|r| r.order_id).collect();
        assert_eq!(batch.len(), 10);
        assert_eq!(ids.len(), 10);
    }
}
