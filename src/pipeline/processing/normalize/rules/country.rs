use std::collections::{BTreeMap, HashMap};

use super::FieldRule;
use crate::types::{CleanRecord, FieldName, RawRecord, RejectionReason};

/// Closed-set lookup from lower-cased spellings to a canonical country name
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    lookup: HashMap<String, String>,
}

impl CountryTable {
    pub fn from_map(countries: &BTreeMap<String, Vec<String>>) -> Self {
        let mut lookup = HashMap::new();
        for (canonical, spellings) in countries {
            lookup.insert(canonical.trim().to_lowercase(), canonical.clone());
            for spelling in spellings {
                lookup.insert(spelling.trim().to_lowercase(), canonical.clone());
            }
        }
        Self { lookup }
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Canonical name when mapped, title-cased input otherwise.
    /// Only empty input is rejected.
    pub fn canonicalize(&self, text: &str) -> Result<String, RejectionReason> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RejectionReason::MissingCountry);
        }

        match self.lookup.get(&trimmed.to_lowercase()) {
            Some(canonical) => Ok(canonical.clone()),
            None => Ok(title_case(trimmed)),
        }
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct CountryRule {
    table: CountryTable,
}

impl CountryRule {
    pub fn new(table: CountryTable) -> Self {
        Self { table }
    }
}

impl FieldRule for CountryRule {
    fn field(&self) -> FieldName {
        FieldName::Country
    }

    fn name(&self) -> &str {
        "country_canonical"
    }

    fn apply(&self, raw: &RawRecord, clean: &mut CleanRecord) -> Result<(), RejectionReason> {
        clean.country = Some(self.table.canonicalize(&raw.country)?);
        Ok(())
    }
}
