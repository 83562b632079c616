/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "ORDER_CLEANER_CONFIG";

/// Date formats tried in priority order when no configuration overrides them
pub const DEFAULT_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

pub const DEFAULT_TOP_CUSTOMERS: usize = 5;

/// Columns every input batch must carry
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "order_id",
    "customer_name",
    "email",
    "order_date",
    "amount",
    "country",
];

// Output file names written by the clean command
pub const CLEAN_RECORDS_FILE: &str = "clean_records.ndjson";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.ndjson";
