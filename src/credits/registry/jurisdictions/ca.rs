use super::JurisdictionConfig;
use crate::credits::domain::{fields, EntityType, Method};
use crate::credits::forms::{
    entity_rate, field, lesser, sum, Expr, FormDefinition, LineConstraints, LineDefinition,
};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Share of the credit kept after the IRC §280C(c) reduced-credit election.
fn reduced_credit_percentage() -> Expr {
    entity_rate(
        [
            (EntityType::CCorporation, 0.9116),
            (EntityType::SCorporation, 0.985),
        ],
        0.877,
    )
}

/// California Form 3523, Research Credit.
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "CA",
        "California",
        CreditMetadata::new(0.15, CreditType::Incremental, "CA Form 3523")
            .fallback_rate(0.15),
    )
    .with_form(regular_credit())
    .with_form(alternative_incremental_credit())
    .with_rules(vec![ValidationRule::note(
        "California research credits carry over indefinitely until exhausted",
    )])
    .with_notes([
        "Regular credit: 15% of qualified research expenses over the base amount plus 24% of basic research payments.",
        "Alternative incremental credit uses the three-tier gross receipts computation (Section B).",
    ])
}

fn regular_credit() -> FormDefinition {
    FormDefinition::sequential(
        "California Form 3523 (Section A)",
        Method::Standard,
        "ca_credit",
        vec![
            LineDefinition::input(
                "1",
                "Basic research payments paid or incurred",
                fields::BASIC_RESEARCH_PAYMENTS,
            ),
            LineDefinition::input("2", "Base period amount", fields::BASE_PERIOD_AMOUNT),
            LineDefinition::computed(
                "3",
                "Subtract line 2 from line 1. If less than zero, enter 0",
                "ca_basic_research_excess",
                field(fields::BASIC_RESEARCH_PAYMENTS)
                    .minus(field(fields::BASE_PERIOD_AMOUNT))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "4",
                "Multiply line 3 by 24%",
                "ca_basic_research_credit",
                field("ca_basic_research_excess").rate(0.24),
            ),
            LineDefinition::input("5", "Wages for qualified services", fields::WAGES),
            LineDefinition::input("6", "Cost of supplies", fields::SUPPLIES),
            LineDefinition::input(
                "7",
                "Rental or lease costs of computers",
                fields::COMPUTER_LEASES,
            ),
            LineDefinition::input("8", "Contract research expenses", fields::CONTRACT_RESEARCH),
            LineDefinition::computed(
                "9",
                "Total qualified research expenses. Add lines 5 through 8",
                "ca_total_qre",
                sum([
                    field(fields::WAGES),
                    field(fields::SUPPLIES),
                    field(fields::COMPUTER_LEASES),
                    field(fields::CONTRACT_RESEARCH),
                ]),
            ),
            LineDefinition::input("10", "Fixed-base percentage", "ca_fixed_base_percentage")
                .percentage()
                .with_default(3.0)
                .with_constraints(LineConstraints {
                    min: Some(0.0),
                    max: Some(16.0),
                    required: false,
                }),
            LineDefinition::input(
                "11",
                "Average annual gross receipts",
                fields::AVG_GROSS_RECEIPTS,
            ),
            LineDefinition::computed(
                "12",
                "Base amount. Multiply line 11 by the percentage on line 10",
                "ca_base_amount",
                field(fields::AVG_GROSS_RECEIPTS).percent(field("ca_fixed_base_percentage")),
            ),
            LineDefinition::computed(
                "13",
                "Subtract line 12 from line 9. If less than zero, enter 0",
                "ca_excess_qre",
                field("ca_total_qre").minus(field("ca_base_amount")).floor_zero(),
            ),
            LineDefinition::computed(
                "14",
                "Multiply line 9 by 50%",
                "ca_half_qre",
                field("ca_total_qre").rate(0.5),
            ),
            LineDefinition::computed(
                "15",
                "Enter the smaller of line 13 or line 14",
                "ca_qualified_excess",
                lesser(field("ca_excess_qre"), field("ca_half_qre")),
            ),
            LineDefinition::computed(
                "16",
                "Multiply line 15 by 15%",
                "ca_qre_credit",
                field("ca_qualified_excess").rate(0.15),
            ),
            LineDefinition::computed(
                "17a",
                "Add line 4 and line 16",
                "ca_credit_before_reduction",
                field("ca_basic_research_credit").plus(field("ca_qre_credit")),
            ),
            LineDefinition::computed(
                "17b",
                "Reduced credit under IRC Section 280C(c)",
                "ca_credit",
                field("ca_credit_before_reduction").times(reduced_credit_percentage()),
            ),
        ],
    )
}

fn alternative_incremental_credit() -> FormDefinition {
    FormDefinition::sequential(
        "California Form 3523 (Section B, Alternative Incremental Credit)",
        Method::Alternative,
        "ca_alt_credit",
        vec![
            LineDefinition::computed(
                "20",
                "Basic research payments over the base period amount. If less than zero, enter 0",
                "ca_alt_basic_research_excess",
                field(fields::BASIC_RESEARCH_PAYMENTS)
                    .minus(field(fields::BASE_PERIOD_AMOUNT))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "21",
                "Multiply line 20 by 24%",
                "ca_alt_basic_research_credit",
                field("ca_alt_basic_research_excess").rate(0.24),
            ),
            LineDefinition::input("22", "Wages for qualified services", fields::WAGES),
            LineDefinition::input("23", "Cost of supplies", fields::SUPPLIES),
            LineDefinition::input(
                "24",
                "Rental or lease costs of computers",
                fields::COMPUTER_LEASES,
            ),
            LineDefinition::input("25", "Contract research expenses", fields::CONTRACT_RESEARCH),
            LineDefinition::computed(
                "26",
                "Total qualified research expenses. Add lines 22 through 25",
                "ca_alt_total_qre",
                sum([
                    field(fields::WAGES),
                    field(fields::SUPPLIES),
                    field(fields::COMPUTER_LEASES),
                    field(fields::CONTRACT_RESEARCH),
                ]),
            ),
            LineDefinition::input(
                "27",
                "Average annual gross receipts",
                fields::AVG_GROSS_RECEIPTS,
            ),
            LineDefinition::computed(
                "28",
                "Multiply line 27 by 1%",
                "ca_alt_first_base",
                field(fields::AVG_GROSS_RECEIPTS).rate(0.01),
            ),
            LineDefinition::computed(
                "29",
                "Subtract line 28 from line 26. If less than zero, enter 0",
                "ca_alt_over_first_base",
                field("ca_alt_total_qre").minus(field("ca_alt_first_base")).floor_zero(),
            ),
            LineDefinition::computed(
                "30",
                "Multiply line 27 by 1.5%",
                "ca_alt_second_base",
                field(fields::AVG_GROSS_RECEIPTS).rate(0.015),
            ),
            LineDefinition::computed(
                "31",
                "Subtract line 30 from line 26. If less than zero, enter 0",
                "ca_alt_over_second_base",
                field("ca_alt_total_qre").minus(field("ca_alt_second_base")).floor_zero(),
            ),
            LineDefinition::computed(
                "32",
                "Subtract line 31 from line 29. If less than zero, enter 0",
                "ca_alt_first_tier",
                field("ca_alt_over_first_base")
                    .minus(field("ca_alt_over_second_base"))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "33",
                "Multiply line 27 by 2%",
                "ca_alt_third_base",
                field(fields::AVG_GROSS_RECEIPTS).rate(0.02),
            ),
            LineDefinition::computed(
                "34",
                "Subtract line 33 from line 26. If less than zero, enter 0",
                "ca_alt_third_tier",
                field("ca_alt_total_qre").minus(field("ca_alt_third_base")).floor_zero(),
            ),
            LineDefinition::computed(
                "35",
                "Subtract line 34 from line 31. If less than zero, enter 0",
                "ca_alt_second_tier",
                field("ca_alt_over_second_base")
                    .minus(field("ca_alt_third_tier"))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "36",
                "Multiply line 32 by 1.49%",
                "ca_alt_first_tier_credit",
                field("ca_alt_first_tier").rate(0.0149),
            ),
            LineDefinition::computed(
                "37",
                "Multiply line 35 by 1.98%",
                "ca_alt_second_tier_credit",
                field("ca_alt_second_tier").rate(0.0198),
            ),
            LineDefinition::computed(
                "38",
                "Multiply line 34 by 2.48%",
                "ca_alt_third_tier_credit",
                field("ca_alt_third_tier").rate(0.0248),
            ),
            LineDefinition::computed(
                "39a",
                "Add lines 21, 36, 37, and 38",
                "ca_alt_credit_before_reduction",
                sum([
                    field("ca_alt_basic_research_credit"),
                    field("ca_alt_first_tier_credit"),
                    field("ca_alt_second_tier_credit"),
                    field("ca_alt_third_tier_credit"),
                ]),
            ),
            LineDefinition::computed(
                "39b",
                "Reduced credit under IRC Section 280C(c)",
                "ca_alt_credit",
                field("ca_alt_credit_before_reduction").times(reduced_credit_percentage()),
            ),
        ],
    )
}
