use std::collections::BTreeMap;

use crate::credits::domain::{EntityType, QreBaseData};
use crate::credits::forms::FieldLookup;

/// Working values for one evaluation: a copy of the base snapshot with the
/// caller's overrides layered on top.
#[derive(Debug, Clone, Default)]
pub(crate) struct DataBag {
    values: BTreeMap<String, f64>,
    entity_type: Option<EntityType>,
}

impl DataBag {
    pub(crate) fn seeded(base: &QreBaseData) -> Self {
        let values = base
            .entries()
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        Self {
            values,
            entity_type: base.entity_type,
        }
    }

    pub(crate) fn apply_overrides(&mut self, overrides: &BTreeMap<String, f64>) {
        for (key, value) in overrides {
            self.values.insert(key.clone(), *value);
        }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub(crate) fn set(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), value);
    }

    pub(crate) fn into_values(self) -> BTreeMap<String, f64> {
        self.values
    }
}

impl FieldLookup for DataBag {
    fn field(&self, key: &str) -> Option<f64> {
        self.get(key)
    }

    fn entity_type(&self) -> Option<EntityType> {
        self.entity_type
    }
}
