use super::{
    qre_input_lines, total_of_qre_inputs, JurisdictionConfig, CORPORATIONS_AND_PARTNERSHIPS,
};
use crate::credits::domain::{fields, Method};
use crate::credits::forms::{field, FormDefinition, LineConstraints, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Georgia Form IT-RD, Research Tax Credit.
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "GA",
        "Georgia",
        CreditMetadata::new(0.10, CreditType::Incremental, "GA Form IT-RD")
            .carryforward(10)
            .fallback_rate(0.10),
    )
    .with_form(research_tax_credit())
    .with_rules(vec![
        ValidationRule::max_credit_of_liability(
            50.0,
            "Credit limited to 50% of the taxpayer's Georgia income tax liability",
        ),
        ValidationRule::carryforward(
            10,
            "Unused credits may be carried forward for up to 10 years",
        ),
        ValidationRule::entity_restriction(
            CORPORATIONS_AND_PARTNERSHIPS,
            "Available to corporations and partnerships with Georgia source income",
        ),
        ValidationRule::gross_receipts_minimum(
            100_000.0,
            "Minimum $100,000 in gross receipts in the taxable year to qualify",
        ),
        ValidationRule::note(
            "Must file Form IT-RD and attach detailed schedule to claim the credit",
        ),
        ValidationRule::note(
            "Application must be filed by April 15th of the year following the taxable year",
        ),
    ])
    .with_notes([
        "Credit is non-refundable and may only be used to offset Georgia income tax liability",
        "Most taxpayers use a 3% fixed-base percentage unless they qualify for a higher rate",
    ])
}

fn research_tax_credit() -> FormDefinition {
    let mut lines = qre_input_lines();
    lines.extend([
        LineDefinition::computed(
            "1",
            "Qualified research expenses for the current year (wages, supplies, contract research)",
            "ga_qre",
            total_of_qre_inputs(),
        ),
        LineDefinition::input(
            "2",
            "Average annual gross receipts for the taxable years preceding the credit year",
            fields::AVG_GROSS_RECEIPTS,
        ),
        LineDefinition::input(
            "3",
            "Fixed-base percentage (3% for most taxpayers, 16% maximum)",
            "ga_fixed_base_percentage",
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
            "ga_base_amount",
            field(fields::AVG_GROSS_RECEIPTS).percent(field("ga_fixed_base_percentage")),
        ),
        LineDefinition::computed(
            "5",
            "Incremental qualified research expenses (line 1 - line 4, but not less than zero)",
            "ga_incremental_qre",
            field("ga_qre").minus(field("ga_base_amount")).floor_zero(),
        ),
        LineDefinition::computed(
            "6",
            "Georgia R&D credit (line 5 x 10%)",
            "ga_credit",
            field("ga_incremental_qre").rate(0.10),
        ),
    ]);

    FormDefinition::sequential(
        "GA Form IT-RD - Research Tax Credit",
        Method::Standard,
        "ga_credit",
        lines,
    )
}
