//! Jurisdiction configuration catalog.
//!
//! The registry is built once (from the built-in catalog or a JSON file) and
//! handed by reference to every evaluation. Nothing mutates it afterwards.

mod jurisdictions;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;

use super::domain::{fields, Method};
use super::forms::{ConfigError, FormDefinition};
use super::validation::ValidationRule;
use crate::config::RegistryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    Incremental,
    Flat,
    Tiered,
}

impl CreditType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Incremental => "Incremental",
            Self::Flat => "Flat",
            Self::Tiered => "Tiered",
        }
    }
}

/// Descriptive facts about a credit. Nothing here feeds the calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditMetadata {
    pub credit_rate: f64,
    pub credit_type: CreditType,
    pub form_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carryforward_years: Option<u32>,
    #[serde(default)]
    pub refundable: bool,
    /// Quick-estimate flat rate carried for reporting. Credits always come
    /// from the form lines, so this can drift from the law without affecting
    /// results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_rate: Option<f64>,
}

impl CreditMetadata {
    pub fn new(
        credit_rate: f64,
        credit_type: CreditType,
        form_reference: impl Into<String>,
    ) -> Self {
        Self {
            credit_rate,
            credit_type,
            form_reference: form_reference.into(),
            carryforward_years: None,
            refundable: false,
            fallback_rate: None,
        }
    }

    pub fn carryforward(mut self, years: u32) -> Self {
        self.carryforward_years = Some(years);
        self
    }

    pub fn refundable(mut self) -> Self {
        self.refundable = true;
        self
    }

    pub fn fallback_rate(mut self, rate: f64) -> Self {
        self.fallback_rate = Some(rate);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionConfig {
    pub code: String,
    pub name: String,
    pub forms: BTreeMap<Method, FormDefinition>,
    pub has_alternative_method: bool,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,
    pub metadata: CreditMetadata,
}

impl JurisdictionConfig {
    pub fn new(code: impl Into<String>, name: impl Into<String>, metadata: CreditMetadata) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            forms: BTreeMap::new(),
            has_alternative_method: false,
            notes: Vec::new(),
            validation_rules: Vec::new(),
            metadata,
        }
    }

    /// Files `form` under its own method; an alternative form also sets
    /// `has_alternative_method`.
    pub fn with_form(mut self, form: FormDefinition) -> Self {
        if form.method == Method::Alternative {
            self.has_alternative_method = true;
        }
        self.forms.insert(form.method, form);
        self
    }

    pub fn with_rules(mut self, rules: Vec<ValidationRule>) -> Self {
        self.validation_rules = rules;
        self
    }

    pub fn with_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notes = notes.into_iter().map(Into::into).collect();
        self
    }

    pub fn form(&self, method: Method) -> Option<&FormDefinition> {
        self.forms.get(&method)
    }

    pub fn require_form(&self, method: Method) -> Result<&FormDefinition, ConfigError> {
        self.form(method).ok_or_else(|| ConfigError::MissingForm {
            jurisdiction: self.code.clone(),
            method,
        })
    }

    /// Verifies every form, the method map, and the fields each validation
    /// rule reads.
    pub fn verify(&self) -> Result<(), ConfigError> {
        self.require_form(Method::Standard)?;
        if self.has_alternative_method {
            self.require_form(Method::Alternative)?;
        }

        for (method, form) in &self.forms {
            if form.method != *method {
                return Err(ConfigError::MethodMismatch {
                    jurisdiction: self.code.clone(),
                    method: *method,
                });
            }
            form.verify()?;
        }

        for rule in &self.validation_rules {
            self.verify_rule(rule)?;
        }

        Ok(())
    }

    /// A rule condition sees base data only, so it may read base fields or
    /// input lines. A ceiling or apportionment field is read after evaluation
    /// and must exist on every form the rule governs.
    fn verify_rule(&self, rule: &ValidationRule) -> Result<(), ConfigError> {
        let governed: Vec<&FormDefinition> = self
            .forms
            .values()
            .filter(|form| rule.applies_to.matches(form.method))
            .collect();

        if let Some(condition) = &rule.condition {
            for reference in condition.references() {
                let known = fields::is_base(reference)
                    || governed.iter().any(|form| form.declares_input(reference));
                if !known {
                    return Err(self.dangling_rule_reference(rule, reference));
                }
            }
        }

        if let Some(reference) = rule.kind.field_reference() {
            let known = fields::is_base(reference)
                || (!governed.is_empty()
                    && governed.iter().all(|form| form.line(reference).is_some()));
            if !known {
                return Err(self.dangling_rule_reference(rule, reference));
            }
        }

        Ok(())
    }

    fn dangling_rule_reference(&self, rule: &ValidationRule, field: &str) -> ConfigError {
        ConfigError::DanglingRuleReference {
            jurisdiction: self.code.clone(),
            rule: rule.kind.label().to_string(),
            field: field.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to open jurisdiction catalog {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("jurisdiction catalog is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("jurisdiction {0} is defined more than once")]
    DuplicateJurisdiction(String),
}

/// Immutable code → configuration map.
#[derive(Debug, Clone)]
pub struct JurisdictionRegistry {
    configs: BTreeMap<String, JurisdictionConfig>,
}

impl JurisdictionRegistry {
    /// The built-in catalog.
    pub fn standard() -> Self {
        let configs = jurisdictions::catalog()
            .into_iter()
            .map(|config| (normalize_code(&config.code), config))
            .collect();
        Self { configs }
    }

    pub fn from_configs<I>(configs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = JurisdictionConfig>,
    {
        let mut map = BTreeMap::new();
        for config in configs {
            let code = normalize_code(&config.code);
            if map.contains_key(&code) {
                return Err(RegistryError::DuplicateJurisdiction(code));
            }
            map.insert(code, config);
        }
        Ok(Self { configs: map })
    }

    /// Loads a JSON array of jurisdiction configurations.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let configs: Vec<JurisdictionConfig> = serde_json::from_reader(reader)?;
        Self::from_configs(configs)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|source| RegistryError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let registry = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path_ref.display(),
            jurisdictions = registry.len(),
            "loaded jurisdiction catalog"
        );
        Ok(registry)
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        match &config.catalog_path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::standard()),
        }
    }

    pub fn to_json_string(&self) -> Result<String, RegistryError> {
        let configs: Vec<&JurisdictionConfig> = self.configs.values().collect();
        Ok(serde_json::to_string_pretty(&configs)?)
    }

    /// Case-insensitive lookup by jurisdiction code.
    pub fn lookup(&self, code: &str) -> Option<&JurisdictionConfig> {
        self.configs.get(&normalize_code(code))
    }

    /// Every configuration, ordered by code.
    pub fn list_all(&self) -> Vec<&JurisdictionConfig> {
        self.configs.values().collect()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// First defect found across the catalog, tagged with its jurisdiction.
    pub fn verify_all(&self) -> Result<(), (String, ConfigError)> {
        for (code, config) in &self.configs {
            config.verify().map_err(|err| (code.clone(), err))?;
        }
        Ok(())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
