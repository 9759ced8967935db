mod rules;

pub use rules::{Applicability, CeilingBasis, RuleKind, Severity, ValidationRule};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Method, QreBaseData};
use super::evaluation::EvaluationResult;
use super::forms::FieldLookup;
use super::registry::JurisdictionConfig;

/// Outcome of applying a jurisdiction's rules to one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Lowest ceiling computed by max-credit rules, for the caller to apply.
    pub max_credit: Option<f64>,
    pub carryforward_years: Option<u32>,
}

impl ValidationResult {
    fn empty() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            max_credit: None,
            carryforward_years: None,
        }
    }

    pub fn apply_ceiling(&self, credit: f64) -> f64 {
        match self.max_credit {
            Some(ceiling) => credit.min(ceiling),
            None => credit,
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Read-only rule checker; never mutates base data or evaluation output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        config: &JurisdictionConfig,
        base: &QreBaseData,
        evaluated: &EvaluationResult,
        method: Method,
    ) -> ValidationResult {
        let mut result = ValidationResult::empty();

        for rule in &config.validation_rules {
            if !rule.applies_to.matches(method) {
                continue;
            }
            if let Some(condition) = &rule.condition {
                match condition.evaluate(base) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        result.warning(format!(
                            "{} rule skipped: condition could not be evaluated ({err})",
                            rule.kind.label()
                        ));
                        continue;
                    }
                }
            }

            debug!(
                jurisdiction = %config.code,
                %method,
                rule = rule.kind.label(),
                "applying validation rule"
            );
            apply_rule(rule, base, evaluated, &mut result);
        }

        result
    }
}

fn apply_rule(
    rule: &ValidationRule,
    base: &QreBaseData,
    evaluated: &EvaluationResult,
    result: &mut ValidationResult,
) {
    match &rule.kind {
        RuleKind::MaxCreditRatio { percent, basis } => {
            let amount = match basis {
                CeilingBasis::TotalQre => Some(base.total_qre()),
                CeilingBasis::Field(key) => evaluated.value(key).or_else(|| base.field(key)),
            };
            match amount {
                Some(amount) => {
                    let ceiling = amount * percent / 100.0;
                    result.warning(format!(
                        "Maximum credit allowed: {}",
                        format_currency(ceiling)
                    ));
                    result.max_credit = Some(match result.max_credit {
                        Some(existing) => existing.min(ceiling),
                        None => ceiling,
                    });
                }
                None => result.warning(format!(
                    "{} (ceiling not computed: no value on record)",
                    rule.message
                )),
            }
        }
        RuleKind::CarryforwardLimit { years } => {
            result.warning(format!("Carryforward limit: {years} years"));
            result.carryforward_years = Some(match result.carryforward_years {
                Some(existing) => existing.min(*years),
                None => *years,
            });
        }
        RuleKind::ApportionmentRequirement { field } => {
            let factor = evaluated.value(field).or_else(|| base.field(field));
            if factor.map_or(true, |factor| factor <= 0.0) {
                result.error(rule.message.clone());
            }
        }
        RuleKind::EntityTypeRestriction { allowed } => match base.entity_type {
            Some(entity) if !allowed.contains(&entity) => result.error(rule.message.clone()),
            Some(_) => {}
            None => result.warning(format!("Entity type not on record. {}", rule.message)),
        },
        RuleKind::GrossReceiptsThreshold { minimum } => {
            let average = base.avg_gross_receipts;
            if average > 0.0 && average < *minimum {
                result.warning(rule.message.clone());
            }
        }
        RuleKind::Custom { severity } => match severity {
            Severity::Error => result.error(rule.message.clone()),
            Severity::Warning => result.warning(rule.message.clone()),
        },
    }
}

/// `$1,234,568` style rendering, rounded to whole dollars.
pub(crate) fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_currency;

    #[test]
    fn currency_is_grouped_by_thousands() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_234_567.8), "$1,234,568");
        assert_eq!(format_currency(-2500.0), "-$2,500");
    }
}
