//! Method Comparator: evaluates every available method of one jurisdiction
//! and recommends the higher credit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::domain::{Method, QreBaseData};
use super::evaluation::{EvaluationResult, LineEvaluator, Overrides};
use super::forms::{ConfigError, FormDefinition};
use super::registry::JurisdictionConfig;

/// Overrides keyed by the method whose form they apply to.
pub type MethodOverrides = BTreeMap<Method, Overrides>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Standard,
    Alternative,
    Equal,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Alternative => "alternative",
            Self::Equal => "equal",
        }
    }

    /// Method to claim under this recommendation. Ties go to standard.
    pub const fn method(self) -> Method {
        match self {
            Self::Alternative => Method::Alternative,
            Self::Standard | Self::Equal => Method::Standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub standard_credit: f64,
    pub alternative_credit: Option<f64>,
    pub recommendation: Recommendation,
    /// `alternative - standard`; zero when no alternative exists.
    pub difference: f64,
}

impl ComparisonResult {
    fn from_credits(standard_credit: f64, alternative_credit: Option<f64>) -> Self {
        let (recommendation, difference) = match alternative_credit {
            None => (Recommendation::Standard, 0.0),
            Some(alternative) if alternative > standard_credit => {
                (Recommendation::Alternative, alternative - standard_credit)
            }
            Some(alternative) if alternative < standard_credit => {
                (Recommendation::Standard, alternative - standard_credit)
            }
            Some(_) => (Recommendation::Equal, 0.0),
        };

        Self {
            standard_credit,
            alternative_credit,
            recommendation,
            difference,
        }
    }

    pub fn recommended_method(&self) -> Method {
        self.recommendation.method()
    }

    pub fn best_credit(&self) -> f64 {
        match self.alternative_credit {
            Some(alternative) => alternative.max(self.standard_credit),
            None => self.standard_credit,
        }
    }
}

/// Comparison together with the evaluations it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedComparison {
    pub comparison: ComparisonResult,
    pub standard: EvaluationResult,
    pub alternative: Option<EvaluationResult>,
}

impl DetailedComparison {
    /// Evaluation for the recommended method.
    pub fn chosen(&self) -> &EvaluationResult {
        match (&self.comparison.recommendation, &self.alternative) {
            (Recommendation::Alternative, Some(alternative)) => alternative,
            _ => &self.standard,
        }
    }

    pub fn into_chosen(self) -> EvaluationResult {
        match (self.comparison.recommendation, self.alternative) {
            (Recommendation::Alternative, Some(alternative)) => alternative,
            _ => self.standard,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MethodComparator {
    evaluator: LineEvaluator,
}

impl MethodComparator {
    pub fn new() -> Self {
        Self {
            evaluator: LineEvaluator::new(),
        }
    }

    pub fn compare(
        &self,
        config: &JurisdictionConfig,
        base: &QreBaseData,
    ) -> Result<ComparisonResult, ConfigError> {
        self.compare_detailed(config, base, &MethodOverrides::new())
            .map(|detailed| detailed.comparison)
    }

    /// Verifies the configuration, then evaluates the standard form and, when
    /// the jurisdiction offers one and its availability predicate holds, the
    /// alternative form.
    pub fn compare_detailed(
        &self,
        config: &JurisdictionConfig,
        base: &QreBaseData,
        overrides: &MethodOverrides,
    ) -> Result<DetailedComparison, ConfigError> {
        config.verify()?;

        let no_overrides = Overrides::new();
        let overrides_for = |method: Method| overrides.get(&method).unwrap_or(&no_overrides);

        let standard_form = config.require_form(Method::Standard)?;
        let standard = self
            .evaluator
            .evaluate(standard_form, base, overrides_for(Method::Standard))?;

        let alternative = if config.has_alternative_method {
            let form = config.require_form(Method::Alternative)?;
            if is_available(config, form, base) {
                Some(
                    self.evaluator
                        .evaluate(form, base, overrides_for(Method::Alternative))?,
                )
            } else {
                None
            }
        } else {
            None
        };

        let comparison = ComparisonResult::from_credits(
            standard.credit(),
            alternative.as_ref().map(EvaluationResult::credit),
        );
        debug!(
            jurisdiction = %config.code,
            standard = comparison.standard_credit,
            alternative = ?comparison.alternative_credit,
            recommendation = comparison.recommendation.label(),
            "compared calculation methods"
        );

        Ok(DetailedComparison {
            comparison,
            standard,
            alternative,
        })
    }
}

fn is_available(config: &JurisdictionConfig, form: &FormDefinition, base: &QreBaseData) -> bool {
    let Some(condition) = &form.availability else {
        return true;
    };
    match condition.evaluate(base) {
        Ok(available) => {
            if !available {
                debug!(
                    jurisdiction = %config.code,
                    form = %form.name,
                    "alternative method not available for this base data"
                );
            }
            available
        }
        Err(err) => {
            warn!(
                jurisdiction = %config.code,
                form = %form.name,
                error = %err,
                "availability check failed; treating alternative as unavailable"
            );
            false
        }
    }
}
