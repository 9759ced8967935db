mod expr;

pub use expr::{
    constant, entity_rate, field, greater, lesser, sum, when, Condition, EntityRate,
    EntityRateTable, Expr, ExprError, FieldLookup,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::domain::{fields, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Currency,
    Percentage,
    Boolean,
}

/// Bounds checked against an editable line once evaluation finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub required: bool,
}

/// One line of a jurisdiction's pro forma.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDefinition {
    pub line: String,
    pub description: String,
    pub field: String,
    pub editable: bool,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calc: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    pub sort_order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<LineConstraints>,
}

impl LineDefinition {
    /// Editable currency input. Sort order is assigned by
    /// [`FormDefinition::sequential`] unless set with [`LineDefinition::at`].
    pub fn input(
        line: impl Into<String>,
        description: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            line: line.into(),
            description: description.into(),
            field: field.into(),
            editable: true,
            data_type: DataType::Currency,
            calc: None,
            default_value: None,
            sort_order: 0.0,
            constraints: None,
        }
    }

    pub fn computed(
        line: impl Into<String>,
        description: impl Into<String>,
        field: impl Into<String>,
        calc: Expr,
    ) -> Self {
        Self {
            editable: false,
            calc: Some(calc),
            ..Self::input(line, description, field)
        }
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn percentage(mut self) -> Self {
        self.data_type = DataType::Percentage;
        self
    }

    pub fn boolean(mut self) -> Self {
        self.data_type = DataType::Boolean;
        self
    }

    pub fn with_constraints(mut self, constraints: LineConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn at(mut self, sort_order: f64) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// A named, ordered set of lines implementing one calculation method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub name: String,
    pub method: Method,
    /// Terminal credit fields; the first is the amount claimed.
    pub credit_fields: Vec<String>,
    /// Base-data predicate gating whether this method may be used at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Condition>,
    pub lines: Vec<LineDefinition>,
}

impl FormDefinition {
    /// Builds a form from lines that already carry their sort orders.
    pub fn new(
        name: impl Into<String>,
        method: Method,
        credit_field: impl Into<String>,
        lines: Vec<LineDefinition>,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            credit_fields: vec![credit_field.into()],
            availability: None,
            lines,
        }
    }

    /// Builds a form whose lines run in declaration order (sort orders 1, 2, ...).
    pub fn sequential(
        name: impl Into<String>,
        method: Method,
        credit_field: impl Into<String>,
        lines: Vec<LineDefinition>,
    ) -> Self {
        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| line.at((index + 1) as f64))
            .collect();

        Self::new(name, method, credit_field, lines)
    }

    pub fn available_when(mut self, condition: Condition) -> Self {
        self.availability = Some(condition);
        self
    }

    pub fn with_credit_field(mut self, field: impl Into<String>) -> Self {
        self.credit_fields.push(field.into());
        self
    }

    pub fn primary_credit_field(&self) -> Option<&str> {
        self.credit_fields.first().map(String::as_str)
    }

    pub fn line(&self, field: &str) -> Option<&LineDefinition> {
        self.lines.iter().find(|line| line.field == field)
    }

    /// True when `field` is an input line, which base extensions can seed.
    pub fn declares_input(&self, field: &str) -> bool {
        self.line(field).map_or(false, |line| line.calc.is_none())
    }

    /// Lines in evaluation order: ascending sort order, ties kept in
    /// declaration order.
    pub fn ordered_lines(&self) -> Vec<&LineDefinition> {
        let mut ordered: Vec<&LineDefinition> = self.lines.iter().collect();
        ordered.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
        ordered
    }

    pub fn is_sort_monotonic(&self) -> bool {
        self.lines
            .windows(2)
            .all(|pair| pair[0].sort_order <= pair[1].sort_order)
    }

    /// Checks the structural invariants a form must hold before it can be
    /// evaluated: unique field keys, finite sort orders, declared credit
    /// fields, calcs that read only earlier lines or base data, and an
    /// availability predicate that reads only base data or input lines.
    pub fn verify(&self) -> Result<(), ConfigError> {
        if self.lines.is_empty() {
            return Err(ConfigError::EmptyForm {
                form: self.name.clone(),
            });
        }

        let mut declared = BTreeSet::new();
        for line in &self.lines {
            if !line.sort_order.is_finite() {
                return Err(ConfigError::InvalidSortOrder {
                    form: self.name.clone(),
                    line: line.line.clone(),
                });
            }
            if !declared.insert(line.field.as_str()) {
                return Err(ConfigError::DuplicateField {
                    form: self.name.clone(),
                    field: line.field.clone(),
                });
            }
        }

        if self.credit_fields.is_empty() {
            return Err(ConfigError::NoCreditField {
                form: self.name.clone(),
            });
        }
        if let Some(missing) = self
            .credit_fields
            .iter()
            .find(|credit| !declared.contains(credit.as_str()))
        {
            return Err(ConfigError::MissingCreditField {
                form: self.name.clone(),
                field: missing.clone(),
            });
        }

        let mut computed = BTreeSet::new();
        for line in self.ordered_lines() {
            if let Some(calc) = &line.calc {
                for reference in calc.references() {
                    if reference == line.field {
                        return Err(ConfigError::SelfReference {
                            form: self.name.clone(),
                            line: line.line.clone(),
                        });
                    }
                    if declared.contains(reference) {
                        if !computed.contains(reference) {
                            return Err(ConfigError::ForwardReference {
                                form: self.name.clone(),
                                line: line.line.clone(),
                                field: reference.to_string(),
                            });
                        }
                    } else if !fields::is_core(reference) {
                        return Err(ConfigError::DanglingReference {
                            form: self.name.clone(),
                            line: line.line.clone(),
                            field: reference.to_string(),
                        });
                    }
                }
            }
            computed.insert(line.field.as_str());
        }

        if let Some(availability) = &self.availability {
            if let Some(unknown) = availability
                .references()
                .into_iter()
                .find(|reference| !fields::is_base(reference) && !self.declares_input(reference))
            {
                return Err(ConfigError::DanglingAvailabilityReference {
                    form: self.name.clone(),
                    field: unknown.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// A jurisdiction configuration that cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("form `{form}` has no lines")]
    EmptyForm { form: String },
    #[error("form `{form}` declares field `{field}` more than once")]
    DuplicateField { form: String, field: String },
    #[error("form `{form}` line {line} has a non-finite sort order")]
    InvalidSortOrder { form: String, line: String },
    #[error("form `{form}` line {line} reads `{field}` before it is computed")]
    ForwardReference {
        form: String,
        line: String,
        field: String,
    },
    #[error("form `{form}` line {line} reads unknown field `{field}`")]
    DanglingReference {
        form: String,
        line: String,
        field: String,
    },
    #[error("form `{form}` availability predicate reads unknown field `{field}`")]
    DanglingAvailabilityReference { form: String, field: String },
    #[error("jurisdiction {jurisdiction} {rule} rule reads unknown field `{field}`")]
    DanglingRuleReference {
        jurisdiction: String,
        rule: String,
        field: String,
    },
    #[error("form `{form}` line {line} reads its own field")]
    SelfReference { form: String, line: String },
    #[error("form `{form}` names no credit field")]
    NoCreditField { form: String },
    #[error("form `{form}` credit field `{field}` is not declared by any line")]
    MissingCreditField { form: String, field: String },
    #[error("jurisdiction {jurisdiction} has no {method} form")]
    MissingForm {
        jurisdiction: String,
        method: Method,
    },
    #[error("jurisdiction {jurisdiction} files its {method} form under the wrong method")]
    MethodMismatch {
        jurisdiction: String,
        method: Method,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_line_form(second: LineDefinition) -> FormDefinition {
        FormDefinition::sequential(
            "Test",
            Method::Standard,
            "credit",
            vec![
                LineDefinition::input("1", "Current QRE", "current"),
                second,
                LineDefinition::computed("3", "Credit", "credit", field("current").rate(0.1)),
            ],
        )
    }

    #[test]
    fn sequential_assigns_monotonic_sort_orders() {
        let form = two_line_form(LineDefinition::input("2", "Base", "base"));
        let orders: Vec<f64> = form.lines.iter().map(|line| line.sort_order).collect();
        assert_eq!(orders, vec![1.0, 2.0, 3.0]);
        assert!(form.is_sort_monotonic());
        assert_eq!(form.verify(), Ok(()));
    }

    #[test]
    fn verify_rejects_forward_reference() {
        let form = two_line_form(LineDefinition::computed(
            "2",
            "Uses credit",
            "early",
            field("credit").rate(2.0),
        ));
        match form.verify() {
            Err(ConfigError::ForwardReference { field, .. }) => assert_eq!(field, "credit"),
            other => panic!("expected forward reference, got {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_duplicates_and_dangling_fields() {
        let duplicate = two_line_form(LineDefinition::input("2", "Again", "current"));
        match duplicate.verify() {
            Err(ConfigError::DuplicateField { field, .. }) => assert_eq!(field, "current"),
            other => panic!("expected duplicate field, got {other:?}"),
        }

        let dangling = two_line_form(LineDefinition::computed(
            "2",
            "Typo",
            "typo",
            field("curent").rate(1.0),
        ));
        match dangling.verify() {
            Err(ConfigError::DanglingReference { field, .. }) => assert_eq!(field, "curent"),
            other => panic!("expected dangling reference, got {other:?}"),
        }
    }

    #[test]
    fn verify_allows_base_fields_and_same_order_earlier_lines() {
        let form = FormDefinition {
            name: "Ties".to_string(),
            method: Method::Standard,
            credit_fields: vec!["credit".to_string()],
            availability: None,
            lines: vec![
                LineDefinition::computed("1", "Total", "total", field(fields::WAGES)).at(1.0),
                LineDefinition::computed("2", "Credit", "credit", field("total")).at(1.0),
            ],
        };
        assert_eq!(form.verify(), Ok(()));
    }

    #[test]
    fn verify_rejects_self_reference_and_undeclared_credit() {
        let looping = two_line_form(LineDefinition::computed(
            "2",
            "Loop",
            "loop",
            field("loop").plus(constant(1.0)),
        ));
        assert!(matches!(
            looping.verify(),
            Err(ConfigError::SelfReference { .. })
        ));

        let mut unnamed = two_line_form(LineDefinition::input("2", "Base", "base"));
        unnamed.credit_fields = vec!["final".to_string()];
        assert!(matches!(
            unnamed.verify(),
            Err(ConfigError::MissingCreditField { .. })
        ));
    }

    #[test]
    fn verify_checks_availability_predicate_fields() {
        let misspelled = two_line_form(LineDefinition::input("2", "Base", "base"))
            .available_when(field("avg_gross_reciepts").lt(constant(5_000_000.0)));
        match misspelled.verify() {
            Err(ConfigError::DanglingAvailabilityReference { field, .. }) => {
                assert_eq!(field, "avg_gross_reciepts")
            }
            other => panic!("expected dangling availability reference, got {other:?}"),
        }

        let reads_base = two_line_form(LineDefinition::input("2", "Base", "base"))
            .available_when(field(fields::AVG_GROSS_RECEIPTS).lt(constant(5_000_000.0)));
        assert_eq!(reads_base.verify(), Ok(()));

        let reads_input = two_line_form(LineDefinition::input("2", "Base", "base"))
            .available_when(field("base").gt(constant(0.0)));
        assert_eq!(reads_input.verify(), Ok(()));

        let reads_calc = two_line_form(LineDefinition::input("2", "Base", "base"))
            .available_when(field("credit").gt(constant(0.0)));
        assert!(matches!(
            reads_calc.verify(),
            Err(ConfigError::DanglingAvailabilityReference { .. })
        ));
    }
}
