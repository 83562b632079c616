use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_ENV_VAR, DEFAULT_DATE_FORMATS, DEFAULT_TOP_CUSTOMERS};
use crate::error::{CleanerError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalize: NormalizeConfig,
    /// Canonical country name -> accepted spellings (matched case-insensitively)
    pub countries: BTreeMap<String, Vec<String>>,
    pub report: ReportConfig,
    /// Manual date corrections applied after automatic parsing
    pub date_overrides: Vec<DateOverrideEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// chrono format strings, tried in order
    pub date_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverrideEntry {
    pub order_id: i64,
    pub order_date: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalize: NormalizeConfig::default(),
            countries: default_countries(),
            report: ReportConfig::default(),
            date_overrides: Vec::new(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_customers: DEFAULT_TOP_CUSTOMERS,
        }
    }
}

fn default_countries() -> BTreeMap<String, Vec<String>> {
    let mut countries = BTreeMap::new();
    countries.insert(
        "United States".to_string(),
        vec!["usa", "us", "u.s.a.", "united states"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    countries.insert("Canada".to_string(), vec!["canada".to_string()]);
    countries.insert(
        "Mexico".to_string(),
        vec!["mexico".to_string(), "méxico".to_string()],
    );
    countries
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path first, then the environment variable, then built-in defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(&PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.normalize.date_formats.is_empty() {
            return Err(CleanerError::Config(
                "normalize.date_formats must list at least one format".to_string(),
            ));
        }
        if self.report.top_customers == 0 {
            return Err(CleanerError::Config(
                "report.top_customers must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.date_overrides {
            if !seen.insert(entry.order_id) {
                return Err(CleanerError::Config(format!(
                    "order_id {} appears more than once in date_overrides",
                    entry.order_id
                )));
            }
        }

        let mut aliases = HashSet::new();
        for (canonical, spellings) in &self.countries {
            for spelling in spellings {
                let key = spelling.trim().to_lowercase();
                if !aliases.insert(key.clone()) {
                    return Err(CleanerError::Config(format!(
                        "country alias '{}' (for {}) is listed more than once",
                        key, canonical
                    )));
                }
            }
        }
        Ok(())
    }
}
