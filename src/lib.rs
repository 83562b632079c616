pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;

pub use config::Config;
pub use error::{CleanerError, Result};
pub use pipeline::ingestion::{Ingestor, RawBatch};
pub use pipeline::{CleanedBatch, Pipeline};
pub use types::{CleanRecord, FieldName, FieldRejection, RawRecord, RejectionReason};
