use super::{total_of_qre_inputs, JurisdictionConfig};
use crate::credits::domain::{EntityType, Method};
use crate::credits::forms::{constant, field, greater, lesser, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Connecticut Form CT-1120 RDC, with Form CT-1120RC as the alternative.
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "CT",
        "Connecticut",
        CreditMetadata::new(0.06, CreditType::Incremental, "CT Form 1120 RDC")
            .carryforward(15)
            .fallback_rate(0.06),
    )
    .with_form(research_and_development_credit())
    .with_form(research_and_experimental_credit())
    .with_rules(vec![
        ValidationRule::max_credit_of_liability(
            50.0,
            "Credit limited to 50% of the taxpayer's Connecticut Corporation Business Tax liability",
        ),
        ValidationRule::carryforward(
            15,
            "Unused credits may be carried forward for up to 15 years",
        ),
        ValidationRule::entity_restriction(
            [EntityType::CCorporation],
            "Available only to corporations subject to Connecticut Corporation Business Tax",
        ),
        ValidationRule::gross_receipts_minimum(
            100_000.0,
            "Minimum $100,000 in gross receipts in the taxable year to qualify",
        )
        .only_for(Method::Standard),
        ValidationRule::note(
            "Must file Form 1120 RDC and attach detailed schedule to claim the credit",
        )
        .only_for(Method::Standard),
        ValidationRule::note(
            "Credit reduction applies if workforce is reduced and expenses exceed $200 million",
        )
        .only_for(Method::Standard)
        .when(total_of_qre_inputs().gt(constant(200_000_000.0))),
    ])
    .with_notes([
        "Credit is non-refundable and may only be used to offset Connecticut Corporation Business Tax liability",
        "Research must be conducted in Connecticut to qualify for the credit",
        "Qualified Small Business is defined as a company with gross income not exceeding $100 million",
    ])
}

fn research_and_development_credit() -> FormDefinition {
    FormDefinition::sequential(
        "CT Form 1120 RDC - Research and Development Expenditures Tax Credit",
        Method::Standard,
        "ct_credit",
        vec![
            LineDefinition::computed(
                "1",
                "Connecticut research and development expenses for the income year",
                "ct_research_expenses",
                total_of_qre_inputs(),
            ),
            LineDefinition::input(
                "2",
                "Incremental research and experimental expenditures from Form CT-1120RC",
                "ct_incremental_expenditures",
            )
            .with_default(0.0),
            LineDefinition::computed(
                "3",
                "Net research and development expenses: subtract line 2 from line 1",
                "ct_net_expenses",
                field("ct_research_expenses")
                    .minus(field("ct_incremental_expenditures"))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "4a",
                "Qualified small businesses: multiply line 3 by 6%",
                "ct_small_business_credit",
                field("ct_net_expenses").rate(0.06),
            ),
            LineDefinition::computed(
                "4b",
                "Enterprise zone election: multiply line 3 by 3.5%",
                "ct_enterprise_zone_credit",
                field("ct_net_expenses").rate(0.035),
            ),
            LineDefinition::input(
                "4c",
                "All other businesses: amount from the Tentative Credit Rate Schedule",
                "ct_rate_schedule_credit",
            )
            .with_default(0.0),
            LineDefinition::input(
                "4",
                "Tentative credit: enter the amount from line 4a, 4b, or 4c",
                "ct_tentative_credit",
            )
            .with_default(0.0),
            LineDefinition::input(
                "5",
                "Reduction of tentative credit (line 3 over $200 million and workforce reduced)",
                "ct_credit_reduction",
            )
            .with_default(0.0),
            LineDefinition::computed(
                "6",
                "Allowable tentative credit: subtract line 5 from line 4",
                "ct_allowable_tentative",
                field("ct_tentative_credit")
                    .minus(field("ct_credit_reduction"))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "II-1",
                "Allowable tentative credit from Part I, line 6",
                "ct_part2_allowable",
                field("ct_allowable_tentative"),
            ),
            LineDefinition::computed(
                "II-2",
                "Multiply line 1 by 33 1/3%",
                "ct_part2_third",
                field("ct_part2_allowable").rate(0.3333),
            ),
            LineDefinition::input(
                "II-3",
                "Connecticut Corporation Business Tax liability",
                "ct_tax_liability",
            )
            .with_default(0.0),
            LineDefinition::computed(
                "II-4",
                "Multiply line 3 by 50%",
                "ct_part2_half_liability",
                field("ct_tax_liability").rate(0.5),
            ),
            LineDefinition::computed(
                "II-5a",
                "Multiply line 1 by two",
                "ct_part2_double_allowable",
                field("ct_part2_allowable").rate(2.0),
            ),
            LineDefinition::computed(
                "II-5b",
                "Enter 90% of line 3",
                "ct_part2_liability_limit",
                field("ct_tax_liability").rate(0.9),
            ),
            LineDefinition::computed(
                "II-5",
                "Enter the lesser of line 5a or line 5b",
                "ct_part2_lesser",
                lesser(
                    field("ct_part2_double_allowable"),
                    field("ct_part2_liability_limit"),
                ),
            ),
            LineDefinition::computed(
                "II-6",
                "Enter the greater of line 4 or line 5",
                "ct_part2_greater",
                greater(field("ct_part2_half_liability"), field("ct_part2_lesser")),
            ),
            LineDefinition::computed(
                "II-7",
                "Research and development expenditures credit: the lesser of line 2 or line 6",
                "ct_credit",
                lesser(field("ct_part2_third"), field("ct_part2_greater")),
            ),
        ],
    )
}

fn research_and_experimental_credit() -> FormDefinition {
    FormDefinition::sequential(
        "CT Form 1120RC - Research and Experimental Expenditures Tax Credit",
        Method::Alternative,
        "ct_alt_credit",
        vec![
            LineDefinition::computed(
                "1",
                "Connecticut research and experimental expenditures for the income year",
                "ct_alt_research_expenses",
                total_of_qre_inputs(),
            ),
            LineDefinition::input(
                "2",
                "Connecticut research and experimental expenditures for the prior income year",
                "ct_alt_prior_year_expenses",
            )
            .with_default(0.0),
            LineDefinition::computed(
                "3",
                "Balance: subtract line 2 from line 1. If zero or less, not eligible",
                "ct_alt_balance",
                field("ct_alt_research_expenses")
                    .minus(field("ct_alt_prior_year_expenses"))
                    .floor_zero(),
            ),
            LineDefinition::computed(
                "4",
                "Tax credit: multiply line 3 by 20%",
                "ct_alt_credit",
                field("ct_alt_balance").rate(0.2),
            ),
        ],
    )
}

