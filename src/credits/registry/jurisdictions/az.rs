use super::{JurisdictionConfig, CORPORATIONS_AND_PARTNERSHIPS};
use crate::credits::domain::{fields, Method};
use crate::credits::forms::{
    constant, field, lesser, sum, when, FormDefinition, LineConstraints, LineDefinition,
};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

const TIER_THRESHOLD: f64 = 2_500_000.0;

/// Arizona Form 308, Credit for Increased Research Activities.
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "AZ",
        "Arizona",
        CreditMetadata::new(0.24, CreditType::Tiered, "AZ Form 308")
            .carryforward(15)
            .fallback_rate(0.24),
    )
    .with_form(form_308())
    .with_rules(vec![
        ValidationRule::carryforward(
            15,
            "Unused credits may be carried forward for up to 15 years",
        ),
        ValidationRule::entity_restriction(
            CORPORATIONS_AND_PARTNERSHIPS,
            "Available to corporations and pass-through entities with Arizona research activity",
        ),
        ValidationRule::note(
            "Refundable portion requires Arizona Commerce Authority certification (fewer than 150 employees)",
        ),
    ])
    .with_notes([
        "24% of the first $2.5M of qualified excess expenses, 15% of the excess plus $600,000 above that.",
    ])
}

fn form_308() -> FormDefinition {
    FormDefinition::sequential(
        "Arizona Form 308",
        Method::Standard,
        "az_credit",
        vec![
            LineDefinition::input(
                "1",
                "Did you have qualified research expenses for the tax year?",
                "az_has_qualified_expenses",
            )
            .boolean()
            .with_default(1.0),
            LineDefinition::input("2", "Is this credit refundable?", "az_is_refundable")
                .boolean()
                .with_default(0.0),
            LineDefinition::input(
                "3",
                "Are you claiming a pass through of this credit from a partnership?",
                "az_partnership_pass_through",
            )
            .boolean()
            .with_default(0.0),
            LineDefinition::input(
                "8",
                "Basic research payments paid or incurred to qualified organizations",
                fields::BASIC_RESEARCH_PAYMENTS,
            ),
            LineDefinition::input(
                "9",
                "Qualified organization base period amount",
                "az_qualified_org_base_period",
            ),
            LineDefinition::computed(
                "10",
                "Subtract line 9 from line 8. If less than zero, enter 0",
                "az_basic_research_excess",
                field(fields::BASIC_RESEARCH_PAYMENTS)
                    .minus(field("az_qualified_org_base_period"))
                    .floor_zero(),
            ),
            LineDefinition::input("11", "Wages for qualified services", fields::WAGES),
            LineDefinition::input("12", "Cost of supplies", fields::SUPPLIES),
            LineDefinition::input("13", "Cost to rent or lease computers", fields::COMPUTER_LEASES),
            LineDefinition::input("14", "Contract research expenses", fields::CONTRACT_RESEARCH),
            LineDefinition::computed(
                "15",
                "Total research expenses",
                "az_total_research_expenses",
                sum([
                    field(fields::WAGES),
                    field(fields::SUPPLIES),
                    field(fields::COMPUTER_LEASES),
                    field(fields::CONTRACT_RESEARCH),
                ]),
            ),
            LineDefinition::input(
                "16",
                "Average annual Arizona gross receipts",
                fields::AVG_GROSS_RECEIPTS,
            ),
            LineDefinition::input(
                "17",
                "Fixed-base percentage, but not more than 16%",
                "az_fixed_base_percentage",
            )
            .percentage()
            .with_default(3.0)
            .with_constraints(LineConstraints {
                min: Some(0.0),
                max: Some(16.0),
                required: false,
            }),
            LineDefinition::computed(
                "18",
                "Base amount: multiply line 16 by the percentage on line 17",
                "az_base_amount",
                field(fields::AVG_GROSS_RECEIPTS).percent(field("az_fixed_base_percentage")),
            ),
            LineDefinition::computed(
                "19",
                "Subtract line 18 from line 15. If less than zero, enter 0",
                "az_excess_over_base",
                field("az_total_research_expenses")
                    .minus(field("az_base_amount"))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "20",
                "Multiply line 15 by 50%",
                "az_half_research_expenses",
                field("az_total_research_expenses").rate(0.5),
            ),
            LineDefinition::computed(
                "21",
                "Enter the lesser of line 19 or line 20",
                "az_qualified_excess",
                lesser(
                    field("az_excess_over_base"),
                    field("az_half_research_expenses"),
                ),
            ),
            LineDefinition::computed(
                "22",
                "Add lines 10 and 21",
                "az_total_qualified_amount",
                field("az_basic_research_excess").plus(field("az_qualified_excess")),
            ),
            LineDefinition::computed(
                "23",
                "Multiply line 22 by 24%",
                "az_tier_one_credit",
                field("az_total_qualified_amount").rate(0.24),
            ),
            LineDefinition::computed(
                "24",
                "Subtract $2,500,000 from line 22. If less than zero, enter 0",
                "az_amount_over_threshold",
                field("az_total_qualified_amount")
                    .minus(constant(TIER_THRESHOLD))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "25",
                "Multiply line 24 by 15%",
                "az_tier_two_excess_credit",
                field("az_amount_over_threshold").rate(0.15),
            ),
            LineDefinition::computed(
                "26",
                "Add $600,000 to line 25",
                "az_tier_two_credit",
                field("az_tier_two_excess_credit").plus(constant(600_000.0)),
            ),
            LineDefinition::computed(
                "27",
                "Enter line 23 if line 22 is $2,500,000 or less, otherwise line 26",
                "az_credit",
                when(
                    field("az_total_qualified_amount").lte(constant(TIER_THRESHOLD)),
                    field("az_tier_one_credit"),
                    field("az_tier_two_credit"),
                ),
            ),
        ],
    )
}
