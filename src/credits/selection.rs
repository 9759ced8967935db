//! Best-Credit Selector: runs the comparator across a set of jurisdictions
//! for one business year and totals the best credit of each.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use super::comparison::{ComparisonResult, MethodComparator, MethodOverrides};
use super::domain::{Method, QreBaseData};
use super::evaluation::EvaluationResult;
use super::forms::ConfigError;
use super::registry::JurisdictionRegistry;
use super::validation::{ValidationEngine, ValidationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionCredit {
    pub code: String,
    pub name: String,
    pub method: Method,
    pub credit: f64,
    pub evaluation: EvaluationResult,
    pub comparison: ComparisonResult,
    pub validation: ValidationResult,
}

impl JurisdictionCredit {
    /// Credit after any max-credit ceiling the rules computed.
    pub fn capped_credit(&self) -> f64 {
        self.validation.apply_ceiling(self.credit)
    }
}

/// A requested jurisdiction whose configuration could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JurisdictionFailure {
    pub code: String,
    pub error: ConfigError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreditSelection {
    pub credits: Vec<JurisdictionCredit>,
    /// Sum of the selected (uncapped) credits.
    pub total: f64,
    pub failures: Vec<JurisdictionFailure>,
}

impl CreditSelection {
    pub fn credit_for(&self, code: &str) -> Option<&JurisdictionCredit> {
        self.credits
            .iter()
            .find(|credit| credit.code.eq_ignore_ascii_case(code.trim()))
    }

    pub fn capped_total(&self) -> f64 {
        self.credits
            .iter()
            .map(JurisdictionCredit::capped_credit)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BestCreditSelector {
    comparator: MethodComparator,
    validator: ValidationEngine,
}

impl BestCreditSelector {
    pub fn new() -> Self {
        Self {
            comparator: MethodComparator::new(),
            validator: ValidationEngine::new(),
        }
    }

    pub fn select_best<I, S>(
        &self,
        registry: &JurisdictionRegistry,
        codes: I,
        base: &QreBaseData,
    ) -> CreditSelection
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select_best_with_overrides(registry, codes, base, &BTreeMap::new())
    }

    /// As [`Self::select_best`], with per-jurisdiction, per-method overrides
    /// keyed by jurisdiction code.
    ///
    /// Codes missing from the registry are skipped. A jurisdiction whose
    /// configuration is defective lands in `failures`; the others still
    /// contribute to the total.
    pub fn select_best_with_overrides<I, S>(
        &self,
        registry: &JurisdictionRegistry,
        codes: I,
        base: &QreBaseData,
        overrides: &BTreeMap<String, MethodOverrides>,
    ) -> CreditSelection
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let no_overrides = MethodOverrides::new();
        let mut seen = BTreeSet::new();
        let mut credits = Vec::new();
        let mut failures = Vec::new();

        for code in codes {
            let requested = code.as_ref();
            let Some(config) = registry.lookup(requested) else {
                debug!(jurisdiction = requested, "no credit configured; skipping");
                continue;
            };
            if !seen.insert(config.code.clone()) {
                continue;
            }

            let jurisdiction_overrides = overrides
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(&config.code))
                .map(|(_, value)| value)
                .unwrap_or(&no_overrides);

            let detailed = match self
                .comparator
                .compare_detailed(config, base, jurisdiction_overrides)
            {
                Ok(detailed) => detailed,
                Err(error) => {
                    warn!(
                        jurisdiction = %config.code,
                        error = %error,
                        "jurisdiction configuration is unusable"
                    );
                    failures.push(JurisdictionFailure {
                        code: config.code.clone(),
                        error,
                    });
                    continue;
                }
            };

            let method = detailed.comparison.recommended_method();
            let comparison = detailed.comparison.clone();
            let evaluation = detailed.into_chosen();
            let validation = self.validator.validate(config, base, &evaluation, method);
            let credit = evaluation.credit();

            info!(
                jurisdiction = %config.code,
                %method,
                credit,
                valid = validation.is_valid,
                "selected jurisdiction credit"
            );

            credits.push(JurisdictionCredit {
                code: config.code.clone(),
                name: config.name.clone(),
                method,
                credit,
                evaluation,
                comparison,
                validation,
            });
        }

        let total = credits.iter().map(|credit| credit.credit).sum();
        CreditSelection {
            credits,
            total,
            failures,
        }
    }
}
