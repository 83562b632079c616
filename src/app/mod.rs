pub mod ports;
pub mod clean_use_case;
pub mod report_use_case;
