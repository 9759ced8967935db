mod bag;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::domain::{Method, QreBaseData};
use super::forms::{ConfigError, ExprError, FormDefinition, LineDefinition};
use bag::DataBag;

/// Caller-supplied values that replace seeded base data for one evaluation.
pub type Overrides = BTreeMap<String, f64>;

/// Runs a form's lines in dependency order against a data bag.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEvaluator;

impl LineEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates every line of `form`. Only a structurally broken form is an
    /// error; a failing calculation zeroes its field and is reported in
    /// [`EvaluationResult::diagnostics`].
    pub fn evaluate(
        &self,
        form: &FormDefinition,
        base: &QreBaseData,
        overrides: &Overrides,
    ) -> Result<EvaluationResult, ConfigError> {
        if let Err(err) = form.verify() {
            warn!(form = %form.name, error = %err, "refusing to evaluate malformed form");
            return Err(err);
        }

        let mut bag = DataBag::seeded(base);
        bag.apply_overrides(overrides);
        let supplied: BTreeSet<String> = form
            .lines
            .iter()
            .filter(|line| bag.contains(&line.field))
            .map(|line| line.field.clone())
            .collect();

        let mut diagnostics = Vec::new();
        for line in form.ordered_lines() {
            match &line.calc {
                Some(calc) => {
                    let value = match calc.evaluate(&bag) {
                        Ok(value) => value,
                        Err(err) => {
                            warn!(
                                form = %form.name,
                                line = %line.line,
                                field = %line.field,
                                error = %err,
                                "line calculation failed; using zero"
                            );
                            diagnostics.push(LineDiagnostic::calculation_failed(line, err));
                            0.0
                        }
                    };
                    bag.set(&line.field, value);
                }
                None if !bag.contains(&line.field) => {
                    if let Some(default) = line.default_value {
                        bag.set(&line.field, default);
                    } else if line.editable {
                        bag.set(&line.field, 0.0);
                    }
                }
                None => {}
            }

            debug!(
                form = %form.name,
                line = %line.line,
                field = %line.field,
                value = ?bag.get(&line.field),
                "evaluated line"
            );
        }

        for line in &form.lines {
            check_constraints(line, &bag, &supplied, &mut diagnostics);
        }

        let credits = form
            .credit_fields
            .iter()
            .map(|field| TerminalCredit {
                field: field.clone(),
                amount: bag.get(field).unwrap_or(0.0).max(0.0),
            })
            .collect();

        Ok(EvaluationResult {
            form_name: form.name.clone(),
            method: form.method,
            values: bag.into_values(),
            credits,
            diagnostics,
        })
    }
}

fn check_constraints(
    line: &LineDefinition,
    bag: &DataBag,
    supplied: &BTreeSet<String>,
    diagnostics: &mut Vec<LineDiagnostic>,
) {
    let Some(constraints) = line.constraints else {
        return;
    };

    if constraints.required && !supplied.contains(&line.field) {
        diagnostics.push(LineDiagnostic::new(
            line,
            DiagnosticKind::MissingRequired,
            format!("line {} ({}) requires a value", line.line, line.description),
        ));
    }

    let Some(value) = bag.get(&line.field) else {
        return;
    };
    if let Some(min) = constraints.min.filter(|min| value < *min) {
        diagnostics.push(LineDiagnostic::new(
            line,
            DiagnosticKind::BelowMinimum,
            format!("line {} is {value}, below the minimum of {min}", line.line),
        ));
    }
    if let Some(max) = constraints.max.filter(|max| value > *max) {
        diagnostics.push(LineDiagnostic::new(
            line,
            DiagnosticKind::AboveMaximum,
            format!("line {} is {value}, above the maximum of {max}", line.line),
        ));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    CalculationFailed,
    MissingRequired,
    BelowMinimum,
    AboveMaximum,
}

/// Line-level warning attached to an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDiagnostic {
    pub line: String,
    pub field: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl LineDiagnostic {
    fn new(line: &LineDefinition, kind: DiagnosticKind, message: String) -> Self {
        Self {
            line: line.line.clone(),
            field: line.field.clone(),
            kind,
            message,
        }
    }

    fn calculation_failed(line: &LineDefinition, err: ExprError) -> Self {
        Self::new(
            line,
            DiagnosticKind::CalculationFailed,
            format!("line {} could not be calculated ({err}); entered as 0", line.line),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalCredit {
    pub field: String,
    pub amount: f64,
}

/// Fully populated data bag plus the form's extracted credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub form_name: String,
    pub method: Method,
    pub values: BTreeMap<String, f64>,
    pub credits: Vec<TerminalCredit>,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl EvaluationResult {
    /// Claimed credit, never negative.
    pub fn credit(&self) -> f64 {
        self.credits
            .first()
            .map(|credit| credit.amount)
            .unwrap_or(0.0)
    }

    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
