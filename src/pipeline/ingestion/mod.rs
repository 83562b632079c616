// Pipeline ingestion: turns a CSV or JSON order table into a batch of raw records.
//
// Structural problems (missing columns, a non-integer key, non-text values)
// fail the whole batch before any row reaches the normalizer.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::constants::REQUIRED_COLUMNS;
use crate::error::{CleanerError, Result};
use crate::types::RawRecord;

pub mod demo;

/// An ordered, immutable sequence of ingested records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatch {
    records: Vec<RawRecord>,
}

impl RawBatch {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RawBatch {
    type Item = &'a RawRecord;
    type IntoIter = std::slice::Iter<'a, RawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub struct Ingestor;

impl Ingestor {
    /// Read a batch from disk, picking the reader from the file extension
    pub fn from_path(path: &Path) -> Result<RawBatch> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let batch = match extension.as_str() {
            "csv" => Self::from_csv_path(path)?,
            "json" => Self::from_json_path(path)?,
            other => {
                return Err(CleanerError::UnsupportedFormat(format!(
                    "'{}' (extension '{}'); expected .csv or .json",
                    path.display(),
                    other
                )))
            }
        };

        info!(path = %path.display(), records = batch.len(), "Ingested batch");
        crate::observability::metrics::ingest::batch_ingested(batch.len());
        Ok(batch)
    }

    pub fn from_csv_path(path: &Path) -> Result<RawBatch> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<RawBatch> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim(), index))
            .collect();

        let mut columns = [0usize; 6];
        for (slot, column) in columns.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
            *slot = *positions
                .get(column)
                .ok_or_else(|| CleanerError::MissingColumn(column.to_string()))?;
        }
        let [id_col, name_col, email_col, date_col, amount_col, country_col] = columns;

        let mut records = Vec::new();
        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;
            let row_number = index + 1;
            let cell = |col: usize| row.get(col).unwrap_or("").to_string();

            let id_text = cell(id_col);
            let order_id = parse_order_id(&id_text, row_number)?;

            records.push(RawRecord {
                order_id,
                customer_name: cell(name_col),
                email: cell(email_col),
                order_date: cell(date_col),
                amount: cell(amount_col),
                country: cell(country_col),
            });
        }

        debug!(records = records.len(), "Read CSV batch");
        Ok(RawBatch::new(records))
    }

    pub fn from_json_path(path: &Path) -> Result<RawBatch> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Reads a JSON array of order objects
    pub fn from_json_reader<R: Read>(reader: R) -> Result<RawBatch> {
        let rows: Vec<serde_json::Value> = serde_json::from_reader(reader)?;

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let object = row.as_object().ok_or_else(|| CleanerError::InvalidField {
                row: row_number,
                column: "*".to_string(),
                message: "expected a JSON object".to_string(),
            })?;

            for column in REQUIRED_COLUMNS {
                match object.get(column) {
                    None => return Err(CleanerError::MissingColumn(column.to_string())),
                    Some(value) => check_json_type(column, value, row_number)?,
                }
            }

            let record: RawRecord =
                serde_json::from_value(row).map_err(|e| CleanerError::InvalidField {
                    row: row_number,
                    column: "*".to_string(),
                    message: e.to_string(),
                })?;
            records.push(record);
        }

        debug!(records = records.len(), "Read JSON batch");
        Ok(RawBatch::new(records))
    }

    /// The built-in demonstration table
    pub fn demo_batch() -> RawBatch {
        demo::demo_batch()
    }
}

/// Write a batch to disk in the format named by the file extension
pub fn write_batch(batch: &RawBatch, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let mut writer = csv::Writer::from_path(path)?;
            for record in batch {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        "json" => {
            let file = File::create(path)?;
            serde_json::to_writer_pretty(std::io::BufWriter::new(file), batch.records())?;
        }
        other => {
            return Err(CleanerError::UnsupportedFormat(format!(
                "'{}' (extension '{}'); expected .csv or .json",
                path.display(),
                other
            )))
        }
    }

    info!(path = %path.display(), records = batch.len(), "Wrote batch");
    Ok(())
}

fn parse_order_id(text: &str, row: usize) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|e| CleanerError::InvalidField {
            row,
            column: "order_id".to_string(),
            message: format!("'{}' is not an integer: {}", text, e),
        })
}

/// `order_id` must be a JSON integer; text columns take a string or null
fn check_json_type(column: &str, value: &serde_json::Value, row: usize) -> Result<()> {
    let expected = if column == "order_id" {
        if value.is_i64() {
            return Ok(());
        }
        "an integer"
    } else {
        if value.is_string() || value.is_null() {
            return Ok(());
        }
        "a string or null"
    };

    Err(CleanerError::InvalidField {
        row,
        column: column.to_string(),
        message: format!("expected {}, found {}", expected, value),
    })
}
