use serde::{Deserialize, Serialize};

use crate::credits::domain::{fields, EntityType, Method};
use crate::credits::forms::Condition;

/// Which calculation methods a rule governs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    Standard,
    Alternative,
    #[default]
    Both,
}

impl Applicability {
    pub const fn matches(self, method: Method) -> bool {
        matches!(
            (self, method),
            (Self::Both, _)
                | (Self::Standard, Method::Standard)
                | (Self::Alternative, Method::Alternative)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Amount a max-credit ratio is measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingBasis {
    /// Wages + supplies + contract research from base data.
    TotalQre,
    /// A named field, read from the evaluated values and then base data.
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RuleKind {
    MaxCreditRatio { percent: f64, basis: CeilingBasis },
    CarryforwardLimit { years: u32 },
    ApportionmentRequirement { field: String },
    EntityTypeRestriction { allowed: Vec<EntityType> },
    GrossReceiptsThreshold { minimum: f64 },
    Custom { severity: Severity },
}

impl RuleKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MaxCreditRatio { .. } => "max_credit_ratio",
            Self::CarryforwardLimit { .. } => "carryforward_limit",
            Self::ApportionmentRequirement { .. } => "apportionment_requirement",
            Self::EntityTypeRestriction { .. } => "entity_type_restriction",
            Self::GrossReceiptsThreshold { .. } => "gross_receipts_threshold",
            Self::Custom { .. } => "custom",
        }
    }

    /// Field whose value the rule reads once the form has been evaluated.
    pub fn field_reference(&self) -> Option<&str> {
        match self {
            Self::MaxCreditRatio {
                basis: CeilingBasis::Field(key),
                ..
            } => Some(key.as_str()),
            Self::ApportionmentRequirement { field } => Some(field.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub kind: RuleKind,
    pub message: String,
    #[serde(default)]
    pub applies_to: Applicability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            applies_to: Applicability::Both,
            condition: None,
        }
    }

    pub fn max_credit(percent: f64, message: impl Into<String>) -> Self {
        Self::new(
            RuleKind::MaxCreditRatio {
                percent,
                basis: CeilingBasis::TotalQre,
            },
            message,
        )
    }

    /// Ceiling as a share of the `tax_liability` input rather than of QRE.
    pub fn max_credit_of_liability(percent: f64, message: impl Into<String>) -> Self {
        Self::max_credit(percent, message)
            .measured_against(CeilingBasis::Field(fields::TAX_LIABILITY.to_string()))
    }

    pub fn carryforward(years: u32, message: impl Into<String>) -> Self {
        Self::new(RuleKind::CarryforwardLimit { years }, message)
    }

    pub fn entity_restriction<I>(allowed: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = EntityType>,
    {
        Self::new(
            RuleKind::EntityTypeRestriction {
                allowed: allowed.into_iter().collect(),
            },
            message,
        )
    }

    pub fn gross_receipts_minimum(minimum: f64, message: impl Into<String>) -> Self {
        Self::new(RuleKind::GrossReceiptsThreshold { minimum }, message)
    }

    pub fn apportionment(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            RuleKind::ApportionmentRequirement {
                field: field.into(),
            },
            message,
        )
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(
            RuleKind::Custom {
                severity: Severity::Warning,
            },
            message,
        )
    }

    pub fn measured_against(mut self, basis: CeilingBasis) -> Self {
        if let RuleKind::MaxCreditRatio { basis: current, .. } = &mut self.kind {
            *current = basis;
        }
        self
    }

    pub fn only_for(mut self, method: Method) -> Self {
        self.applies_to = match method {
            Method::Standard => Applicability::Standard,
            Method::Alternative => Applicability::Alternative,
        };
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}
