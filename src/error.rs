use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid value in row {row}, column '{column}': {message}")]
    InvalidField {
        row: usize,
        column: String,
        message: String,
    },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, CleanerError>;
