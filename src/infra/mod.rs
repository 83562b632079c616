pub mod console_report_adapter;
pub mod json_report_adapter;
pub mod ndjson_output_adapter;

pub use console_report_adapter::ConsoleReportAdapter;
pub use json_report_adapter::JsonReportAdapter;
pub use ndjson_output_adapter::NdjsonOutputAdapter;
