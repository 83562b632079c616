use crate::app::ports::ReportOutputPort;
use crate::app::report_use_case::RunReport;
use std::fmt::Write as _;

/// Prints the reports as plain-text tables on stdout
pub struct ConsoleReportAdapter;

/// Render every report section as text
pub fn render_report(run: &RunReport) -> String {
    let mut out = String::new();
    let report = &run.report;
    let stats = &run.stats;

    let _ = writeln!(out, "\n📊 Run {}", run.run_id);
    let _ = writeln!(
        out,
        "   Records: {} ({} clean, {} with rejected fields)",
        stats.total_records, stats.fully_clean, stats.with_rejections
    );
    let _ = writeln!(out, "   Rejected fields: {}", stats.rejected_fields);
    let _ = writeln!(out, "   Duplicate ids: {}", stats.duplicate_groups);
    let _ = writeln!(
        out,
        "   Date overrides: {} applied, {} unused",
        stats.overrides_applied, stats.unused_overrides
    );

    let _ = writeln!(out, "\n💰 Revenue");
    let _ = writeln!(out, "   Total revenue: {}", report.summary.total_revenue);
    let _ = writeln!(
        out,
        "   Orders with valid amount: {} of {}",
        report.summary.valid_amount_orders, report.summary.total_orders
    );

    let _ = writeln!(out, "\n🌎 Revenue by country");
    let _ = writeln!(out, "   {:<20} {:>7} {:>12}", "country", "orders", "revenue");
    for row in &report.by_country {
        let _ = writeln!(out, "   {:<20} {:>7} {:>12}", row.country, row.orders, row.revenue);
    }

    let _ = writeln!(out, "\n🏆 Top customers");
    let _ = writeln!(
        out,
        "   {:<20} {:<30} {:>7} {:>12}",
        "customer", "email", "orders", "spend"
    );
    for row in &report.top_customers {
        let _ = writeln!(
            out,
            "   {:<20} {:<30} {:>7} {:>12}",
            row.customer_name.as_deref().unwrap_or("-"),
            row.email.as_deref().unwrap_or("-"),
            row.orders,
            row.total_spend
        );
    }

    let _ = writeln!(out, "\n📅 Sales over time");
    let _ = writeln!(out, "   {:<12} {:>7} {:>12}", "date", "orders", "revenue");
    for row in &report.by_date {
        let _ = writeln!(
            out,
            "   {:<12} {:>7} {:>12}",
            row.order_date.format("%Y-%m-%d").to_string(),
            row.orders,
            row.revenue
        );
    }

    out
}

#[async_trait::async_trait]
impl ReportOutputPort for ConsoleReportAdapter {
    async fn write_report(&self, report: &RunReport) -> anyhow::Result<()> {
        print!("{}", render_report(report));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ingestion::Ingestor;
    use crate::pipeline::Pipeline;
    use chrono::Utc;

    #[test]
    fn test_render_lists_every_section() {
        let pipeline = Pipeline::default();
        let cleaned = pipeline.clean(&Ingestor::demo_batch());
        let run = RunReport {
            run_id: cleaned.run_id,
            generated_at: Utc::now(),
            stats: cleaned.stats(),
            report: pipeline.report(&cleaned),
        };

        let text = render_report(&run);

        assert!(text.contains("Total revenue: 948.50"));
        assert!(text.contains("United States"));
        assert!(text.contains("sarah.kim@example.com"));
        assert!(text.contains("2023-07-10"));
        // 42.00 from the nameless order ranks sixth and is cut from the top five
        assert!(!text.contains("no.name@example.com"));
    }
}
