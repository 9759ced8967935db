use super::{total_of_qre_inputs, JurisdictionConfig, CORPORATIONS_AND_PARTNERSHIPS};
use crate::credits::domain::Method;
use crate::credits::forms::{field, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

const FIRST_TIER_LIMIT: f64 = 100_000.0;

/// North Dakota Form 38, Research and Development Credit.
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "ND",
        "North Dakota",
        CreditMetadata::new(0.25, CreditType::Tiered, "ND Form 38").carryforward(15),
    )
    .with_form(form_38())
    .with_rules(vec![
        ValidationRule::max_credit_of_liability(
            100.0,
            "Credit limited to 100% of the taxpayer's North Dakota income tax liability",
        ),
        ValidationRule::carryforward(
            15,
            "Unused credits may be carried forward for up to 15 years",
        ),
        ValidationRule::entity_restriction(
            CORPORATIONS_AND_PARTNERSHIPS,
            "Available to corporations and partnerships with North Dakota source income",
        ),
        ValidationRule::gross_receipts_minimum(
            50_000.0,
            "Minimum $50,000 in gross receipts in the taxable year to qualify",
        ),
        ValidationRule::note(
            "Must provide average QRE for the prior 3 years (or use current year if no prior data)",
        ),
    ])
    .with_notes([
        "25% credit on the first $100,000 of incremental QRE over the prior 3-year average",
        "8% credit on incremental QRE in excess of $100,000",
    ])
}

fn form_38() -> FormDefinition {
    FormDefinition::sequential(
        "ND Form 38 - Research and Development Credit",
        Method::Standard,
        "nd_credit",
        vec![
            LineDefinition::computed(
                "1",
                "North Dakota qualified research expenses for the current year",
                "nd_qre",
                total_of_qre_inputs(),
            ),
            LineDefinition::input(
                "2",
                "Average North Dakota QRE for the prior 3 years",
                "nd_average_prior_qre",
            ),
            LineDefinition::computed(
                "3",
                "Subtract line 2 from line 1. If less than zero, enter zero",
                "nd_incremental_qre",
                field("nd_qre").minus(field("nd_average_prior_qre")).floor_zero(),
            ),
            LineDefinition::computed(
                "4",
                "Enter the lesser of line 3 or $100,000",
                "nd_first_tier",
                field("nd_incremental_qre").capped_at(FIRST_TIER_LIMIT),
            ),
            LineDefinition::computed(
                "5",
                "Subtract line 4 from line 3",
                "nd_excess",
                field("nd_incremental_qre").minus(field("nd_first_tier")).floor_zero(),
            ),
            LineDefinition::computed(
                "6",
                "Multiply line 4 by 25%",
                "nd_first_tier_credit",
                field("nd_first_tier").rate(0.25),
            ),
            LineDefinition::computed(
                "7",
                "Multiply line 5 by 8%",
                "nd_excess_credit",
                field("nd_excess").rate(0.08),
            ),
            LineDefinition::computed(
                "8",
                "Add lines 6 and 7",
                "nd_credit",
                field("nd_first_tier_credit").plus(field("nd_excess_credit")),
            ),
        ],
    )
}
