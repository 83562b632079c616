use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::CleanRecord;

/// Add `amount` into `total`. On overflow the total is left unchanged and
/// the amount is excluded from that sum.
fn add_revenue(total: &mut Decimal, amount: Decimal) {
    match total.checked_add(amount) {
        Some(sum) => *total = sum,
        None => warn!(%total, %amount, "Revenue total overflowed; amount excluded from this sum"),
    }
}

/// Order count and revenue for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub orders: usize,
    pub revenue: Decimal,
}

impl GroupTotals {
    fn add(&mut self, amount: Option<Decimal>) {
        self.orders += 1;
        if let Some(amount) = amount {
            add_revenue(&mut self.revenue, amount);
        }
    }

    fn merge(&mut self, other: GroupTotals) {
        self.orders += other.orders;
        add_revenue(&mut self.revenue, other.revenue);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_orders: usize,
    /// Orders whose amount survived validation
    pub valid_amount_orders: usize,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryTotals {
    pub country: String,
    pub orders: usize,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTotals {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub orders: usize,
    pub total_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub order_date: NaiveDate,
    pub orders: usize,
    pub revenue: Decimal,
}

/// The four reports computed over one cleaned batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub summary: RevenueSummary,
    /// Highest revenue first, ties broken by country name
    pub by_country: Vec<CountryTotals>,
    /// Highest spend first, truncated to the requested size
    pub top_customers: Vec<CustomerTotals>,
    /// Chronological
    pub by_date: Vec<DailyTotals>,
}

// Case-insensitive identity: lower-cased name and email
type CustomerKey = (Option<String>, Option<String>);

#[derive(Debug, Clone)]
struct CustomerEntry {
    customer_name: Option<String>,
    email: Option<String>,
    totals: GroupTotals,
}

impl CustomerEntry {
    // Case variants share one identity; the smallest spelling is displayed
    fn prefer_spelling(&mut self, name: &Option<String>, email: &Option<String>) {
        if let (Some(current), Some(candidate)) = (&self.customer_name, name) {
            if candidate < current {
                self.customer_name = Some(candidate.clone());
            }
        }
        if let (Some(current), Some(candidate)) = (&self.email, email) {
            if candidate < current {
                self.email = Some(candidate.clone());
            }
        }
    }
}

/// Running totals over any subset of a batch.
///
/// Accumulators built over disjoint shards can be merged; the finished
/// report does not depend on how records were split or in which order
/// they were absorbed.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    summary: RevenueSummary,
    countries: BTreeMap<String, GroupTotals>,
    customers: BTreeMap<CustomerKey, CustomerEntry>,
    dates: BTreeMap<NaiveDate, GroupTotals>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into every aggregate it has the fields for
    pub fn absorb(&mut self, record: &CleanRecord) {
        self.summary.total_orders += 1;
        if let Some(amount) = record.amount {
            self.summary.valid_amount_orders += 1;
            add_revenue(&mut self.summary.total_revenue, amount);
        }

        if let Some(country) = &record.country {
            self.countries
                .entry(country.clone())
                .or_default()
                .add(record.amount);
        }

        if let Some(date) = record.order_date {
            self.dates.entry(date).or_default().add(record.amount);
        }

        // Spend ranking needs a known amount and at least one identity field
        if let Some(amount) = record.amount {
            if record.customer_name.is_some() || record.email.is_some() {
                let key = (
                    record.customer_name.as_ref().map(|n| n.to_lowercase()),
                    record.email.as_ref().map(|e| e.to_lowercase()),
                );
                let entry = self.customers.entry(key).or_insert_with(|| CustomerEntry {
                    customer_name: record.customer_name.clone(),
                    email: record.email.clone(),
                    totals: GroupTotals::default(),
                });
                entry.prefer_spelling(&record.customer_name, &record.email);
                entry.totals.add(Some(amount));
            }
        }
    }

    pub fn merge(&mut self, other: Accumulator) {
        self.summary.total_orders += other.summary.total_orders;
        self.summary.valid_amount_orders += other.summary.valid_amount_orders;
        add_revenue(&mut self.summary.total_revenue, other.summary.total_revenue);

        for (country, totals) in other.countries {
            self.countries.entry(country).or_default().merge(totals);
        }
        for (date, totals) in other.dates {
            self.dates.entry(date).or_default().merge(totals);
        }
        for (key, entry) in other.customers {
            match self.customers.get_mut(&key) {
                Some(existing) => {
                    existing.prefer_spelling(&entry.customer_name, &entry.email);
                    existing.totals.merge(entry.totals);
                }
                None => {
                    self.customers.insert(key, entry);
                }
            }
        }
    }

    pub fn finish(self, top_n: usize) -> AggregateReport {
        let mut by_country: Vec<CountryTotals> = self
            .countries
            .into_iter()
            .map(|(country, totals)| CountryTotals {
                country,
                orders: totals.orders,
                revenue: totals.revenue,
            })
            .collect();
        by_country.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.country.cmp(&b.country)));

        // BTreeMap iteration is key-ordered, so the stable sort leaves ties
        // in identity order
        let mut top_customers: Vec<CustomerTotals> = self
            .customers
            .into_values()
            .map(|entry| CustomerTotals {
                customer_name: entry.customer_name,
                email: entry.email,
                orders: entry.totals.orders,
                total_spend: entry.totals.revenue,
            })
            .collect();
        top_customers.sort_by(|a, b| b.total_spend.cmp(&a.total_spend));
        top_customers.truncate(top_n);

        let by_date = self
            .dates
            .into_iter()
            .map(|(order_date, totals)| DailyTotals {
                order_date,
                orders: totals.orders,
                revenue: totals.revenue,
            })
            .collect();

        AggregateReport {
            summary: self.summary,
            by_country,
            top_customers,
            by_date,
        }
    }
}

/// Computes the grouped reports over a cleaned batch
pub struct Aggregator {
    top_n: usize,
}

impl Aggregator {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn aggregate<'a, I>(&self, records: I) -> AggregateReport
    where
        I: IntoIterator<Item = &'a CleanRecord>,
    {
        let mut accumulator = Accumulator::new();
        for record in records {
            accumulator.absorb(record);
        }
        accumulator.finish(self.top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        order_id: i64,
        name: Option<&str>,
        email: Option<&str>,
        date: Option<(i32, u32, u32)>,
        amount: Option<i64>,
        country: Option<&str>,
    ) -> CleanRecord {
        CleanRecord {
            order_id,
            customer_name: name.map(String::from),
            email: email.map(String::from),
            order_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            amount: amount.map(|cents| Decimal::new(cents, 2)),
            country: country.map(String::from),
        }
    }

    fn sample() -> Vec<CleanRecord> {
        vec![
            record(1, Some("John doe"), Some("john@x.com"), Some((2023, 7, 10)), Some(10050), Some("United States")),
            record(2, Some("Jane smith"), Some("jane@x.com"), Some((2023, 7, 11)), Some(20000), Some("United States")),
            record(3, Some("Ana lopez"), None, Some((2023, 7, 10)), None, Some("Mexico")),
            record(4, Some("JOHN DOE"), Some("JOHN@X.COM"), None, Some(8000), Some("Canada")),
            record(5, None, None, Some((2023, 7, 12)), Some(4200), None),
        ]
    }

    #[test]
    fn test_revenue_summary_skips_absent_amounts() {
        let report = Aggregator::new(5).aggregate(&sample());

        assert_eq!(report.summary.total_orders, 5);
        assert_eq!(report.summary.valid_amount_orders, 4);
        assert_eq!(report.summary.total_revenue, Decimal::new(42250, 2));
    }

    #[test]
    fn test_country_counts_include_orders_without_amount() {
        let report = Aggregator::new(5).aggregate(&sample());

        let mexico = report.by_country.iter().find(|c| c.country == "Mexico").unwrap();
        assert_eq!(mexico.orders, 1);
        assert_eq!(mexico.revenue, Decimal::ZERO);

        assert_eq!(report.by_country[0].country, "United States");
        assert_eq!(report.by_country[0].orders, 2);
        assert_eq!(report.by_country[0].revenue, Decimal::new(30050, 2));
        // record 5 has no country
        let counted: usize = report.by_country.iter().map(|c| c.orders).sum();
        assert_eq!(counted, 4);
    }

    #[test]
    fn test_customers_grouped_case_insensitively() {
        let report = Aggregator::new(5).aggregate(&sample());

        assert_eq!(report.top_customers.len(), 2);
        let top = &report.top_customers[0];
        assert_eq!(top.email.as_deref(), Some("jane@x.com"));
        assert_eq!(top.total_spend, Decimal::new(20000, 2));

        let john = &report.top_customers[1];
        assert_eq!(john.orders, 2);
        assert_eq!(john.total_spend, Decimal::new(18050, 2));
    }

    #[test]
    fn test_top_customers_truncated() {
        let report = Aggregator::new(1).aggregate(&sample());
        assert_eq!(report.top_customers.len(), 1);
    }

    #[test]
    fn test_dates_are_chronological() {
        let report = Aggregator::new(5).aggregate(&sample());

        let dates: Vec<NaiveDate> = report.by_date.iter().map(|d| d.order_date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);

        let first = &report.by_date[0];
        assert_eq!(first.orders, 2);
        assert_eq!(first.revenue, Decimal::new(10050, 2));
    }

    #[test]
    fn test_merged_shards_match_single_pass() {
        let records = sample();
        let single = Aggregator::new(5).aggregate(&records);

        let mut left = Accumulator::new();
        let mut right = Accumulator::new();
        for (index, record) in records.iter().enumerate() {
            if index % 2 == 0 {
                left.absorb(record);
            } else {
                right.absorb(record);
            }
        }
        right.merge(left);

        assert_eq!(right.finish(5), single);
    }

    #[test]
    fn test_overflowing_totals_do_not_panic() {
        let mut huge = record(1, Some("Big spender"), None, Some((2023, 7, 10)), None, Some("Canada"));
        huge.amount = Some(Decimal::MAX);
        let mut again = huge.clone();
        again.order_id = 2;

        let report = Aggregator::new(5).aggregate(&vec![huge.clone(), again.clone()]);

        assert_eq!(report.summary.total_orders, 2);
        assert_eq!(report.summary.valid_amount_orders, 2);
        assert_eq!(report.summary.total_revenue, Decimal::MAX);
        assert_eq!(report.by_country[0].orders, 2);
        assert_eq!(report.by_country[0].revenue, Decimal::MAX);
        assert_eq!(report.by_date[0].revenue, Decimal::MAX);
        assert_eq!(report.top_customers[0].orders, 2);
        assert_eq!(report.top_customers[0].total_spend, Decimal::MAX);

        let mut left = Accumulator::new();
        left.absorb(&huge);
        let mut right = Accumulator::new();
        right.absorb(&again);
        left.merge(right);
        assert_eq!(left.finish(5).summary.total_revenue, Decimal::MAX);
    }

    #[test]
    fn test_empty_batch() {
        let report = Aggregator::new(5).aggregate(&Vec::<CleanRecord>::new());
        assert_eq!(report, AggregateReport::default());
    }
}
