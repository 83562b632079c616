use std::collections::BTreeMap;

use super::rules::{AmountRule, CountryRule, CountryTable, DateRule, EmailRule, FieldRule, NameRule};
use super::NormalizedRecord;
use crate::config::Config;
use crate::types::{CleanRecord, FieldName, FieldRejection, RawRecord};

/// Registry of field rules, at most one per field
pub struct RuleRegistry {
    rules: BTreeMap<FieldName, Box<dyn FieldRule>>,
}

impl RuleRegistry {
    /// An empty registry; fields without a rule stay absent
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// The built-in rule set driven by the given configuration
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(NameRule));
        registry.register(Box::new(EmailRule));
        registry.register(Box::new(DateRule::new(config.normalize.date_formats.clone())));
        registry.register(Box::new(AmountRule));
        registry.register(Box::new(CountryRule::new(CountryTable::from_map(&config.countries))));
        registry
    }

    /// Register a rule, replacing any rule already registered for its field
    pub fn register(&mut self, rule: Box<dyn FieldRule>) {
        self.rules.insert(rule.field(), rule);
    }

    pub fn get_rule(&self, field: FieldName) -> Option<&dyn FieldRule> {
        self.rules.get(&field).map(|r| r.as_ref())
    }

    /// List all fields that have a rule
    pub fn list_fields(&self) -> Vec<FieldName> {
        self.rules.keys().copied().collect()
    }

    /// Apply every rule to one raw record
    pub fn apply(&self, raw: &RawRecord) -> NormalizedRecord {
        let mut record = CleanRecord::empty(raw.order_id);
        let mut rejections = Vec::new();

        for (field, rule) in &self.rules {
            if let Err(reason) = rule.apply(raw, &mut record) {
                rejections.push(FieldRejection {
                    order_id: raw.order_id,
                    field: *field,
                    reason,
                    raw_value: raw.field(*field).to_string(),
                });
            }
        }

        NormalizedRecord { record, rejections }
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
