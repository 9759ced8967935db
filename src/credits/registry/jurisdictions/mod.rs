//! Built-in formula tables, one module per jurisdiction.
//!
//! Each module returns a [`JurisdictionConfig`] whose lines follow the
//! jurisdiction's published form. Clamps ("if less than zero, enter zero",
//! "enter the lesser of") are spelled out in the calcs.

mod az;
mod ca;
mod ct;
mod fl;
mod ga;
mod headline;
mod il;
mod ma;
mod nd;
mod nj;
mod ny;
mod oh;
mod pa;
mod tx;
mod va;

use super::JurisdictionConfig;
use crate::credits::domain::{fields, EntityType};
use crate::credits::forms::{field, lesser, sum, Expr, LineConstraints, LineDefinition};

pub(super) fn catalog() -> Vec<JurisdictionConfig> {
    let mut configs = vec![
        az::config(),
        ca::config(),
        ct::config(),
        fl::config(),
        ga::config(),
        il::config(),
        ma::config(),
        nd::config(),
        nj::config(),
        ny::config(),
        oh::config(),
        pa::config(),
        tx::config(),
        va::config(),
    ];
    configs.extend(headline::configs());
    configs
}

/// Wages, supplies, and contract research input lines that lead most forms.
fn qre_input_lines() -> Vec<LineDefinition> {
    vec![
        LineDefinition::input("wages", "Qualified wages", fields::WAGES),
        LineDefinition::input("supplies", "Qualified supplies", fields::SUPPLIES),
        LineDefinition::input("contract", "Contract research", fields::CONTRACT_RESEARCH),
    ]
}

/// Federal-style fixed-base computation: QRE over fixed-base percentage ×
/// average gross receipts, never less than half of QRE as the base, at `rate`.
fn fixed_base_lines(
    prefix: &str,
    rate: f64,
    rate_label: &str,
    credit_field: &str,
) -> Vec<LineDefinition> {
    let key = |suffix: &str| format!("{prefix}_{suffix}");

    let mut lines = qre_input_lines();
    lines.extend([
        LineDefinition::computed(
            "1",
            "Qualified research expenses for the current year",
            key("qre"),
            total_of_qre_inputs(),
        ),
        LineDefinition::input("2", "Average annual gross receipts", fields::AVG_GROSS_RECEIPTS),
        LineDefinition::input(
            "3",
            "Fixed-base percentage (16% maximum)",
            key("fixed_base_percentage"),
        )
        .percentage()
        .with_default(3.0)
        .with_constraints(LineConstraints {
            min: Some(0.0),
            max: Some(16.0),
            required: false,
        }),
        LineDefinition::computed(
            "4",
            "Base amount (line 2 x line 3)",
            key("base_amount"),
            field(fields::AVG_GROSS_RECEIPTS).percent(field(key("fixed_base_percentage"))),
        ),
        LineDefinition::computed(
            "5",
            "Subtract line 4 from line 1. If less than zero, enter 0",
            key("excess_qre"),
            field(key("qre")).minus(field(key("base_amount"))).floor_zero(),
        ),
        LineDefinition::computed(
            "6",
            "Multiply line 1 by 50%",
            key("half_qre"),
            field(key("qre")).rate(0.5),
        ),
        LineDefinition::computed(
            "7",
            "Incremental QRE: the lesser of line 5 or line 6",
            key("incremental_qre"),
            lesser(field(key("excess_qre")), field(key("half_qre"))),
        ),
        LineDefinition::computed(
            "8",
            format!("Multiply line 7 by {rate_label}"),
            credit_field,
            field(key("incremental_qre")).rate(rate),
        ),
    ]);
    lines
}

/// Current-year QRE at a single rate, with no base period.
fn flat_rate_lines(
    prefix: &str,
    rate: f64,
    rate_label: &str,
    credit_field: &str,
) -> Vec<LineDefinition> {
    let qre = format!("{prefix}_qre");

    let mut lines = qre_input_lines();
    lines.extend([
        LineDefinition::computed(
            "1",
            "Qualified research expenses for the current year",
            qre.clone(),
            total_of_qre_inputs(),
        ),
        LineDefinition::computed(
            "2",
            format!("Multiply line 1 by {rate_label}"),
            credit_field,
            field(qre).rate(rate),
        ),
    ]);
    lines
}

fn total_of_qre_inputs() -> Expr {
    sum([
        field(fields::WAGES),
        field(fields::SUPPLIES),
        field(fields::CONTRACT_RESEARCH),
    ])
}

const CORPORATIONS: [EntityType; 2] = [EntityType::CCorporation, EntityType::SCorporation];

const CORPORATIONS_AND_PARTNERSHIPS: [EntityType; 4] = [
    EntityType::CCorporation,
    EntityType::SCorporation,
    EntityType::Partnership,
    EntityType::Llc,
];
