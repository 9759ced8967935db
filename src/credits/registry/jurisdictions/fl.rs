use super::{total_of_qre_inputs, JurisdictionConfig};
use crate::credits::domain::{fields, EntityType, Method};
use crate::credits::forms::{field, lesser, sum, FormDefinition, LineConstraints, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Florida corporate income tax R&D credit (s. 220.196, F.S.).
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "FL",
        "Florida",
        CreditMetadata::new(
            0.10,
            CreditType::Incremental,
            "FL Section 220.196, F.S. & Rule 12C-1.0196, F.A.C.",
        )
        .carryforward(5)
        .fallback_rate(0.03),
    )
    .with_form(corporate_rd_credit())
    .with_rules(vec![
        ValidationRule::entity_restriction(
            [EntityType::CCorporation],
            "Available only to C corporations in qualified target industries",
        ),
        ValidationRule::note(
            "Must obtain certification as qualified target industry business before applying",
        ),
        ValidationRule::note("Application window is only 7 days per year (March 20-26)"),
        ValidationRule::note(
            "Statewide cap of $9 million - credits often prorated due to high demand",
        ),
        ValidationRule::max_credit_of_liability(
            50.0,
            "Limited to 50% of Florida corporate income tax liability",
        ),
    ])
    .with_notes([
        "The claimable amount is the Department of Revenue allocation, which may be prorated below the computed credit.",
    ])
}

fn corporate_rd_credit() -> FormDefinition {
    let prior_year = |line: &str, ordinal: &str, key: &str, order: f64| {
        LineDefinition::input(
            line,
            format!("Florida QRE for {ordinal} prior year"),
            key,
        )
        .at(order)
    };

    FormDefinition::new(
        "FL Corporate Income Tax R&D Credit Application",
        Method::Standard,
        "fl_credit",
        vec![
            LineDefinition::input("wages", "Qualified wages", fields::WAGES).at(0.1),
            LineDefinition::input("supplies", "Qualified supplies", fields::SUPPLIES).at(0.2),
            LineDefinition::input("contract", "Contract research", fields::CONTRACT_RESEARCH)
                .at(0.3),
            LineDefinition::computed(
                "1",
                "Total Florida qualified research expenses for current year",
                "fl_current_year_qre",
                total_of_qre_inputs(),
            )
            .at(1.0),
            prior_year("2", "1st", "fl_prior_year_1_qre", 2.0),
            prior_year("3", "2nd", "fl_prior_year_2_qre", 3.0),
            prior_year("4", "3rd", "fl_prior_year_3_qre", 4.0),
            prior_year("5", "4th", "fl_prior_year_4_qre", 5.0),
            LineDefinition::computed(
                "6",
                "Base amount (average of lines 2-5)",
                "fl_base_amount",
                sum([
                    field("fl_prior_year_1_qre"),
                    field("fl_prior_year_2_qre"),
                    field("fl_prior_year_3_qre"),
                    field("fl_prior_year_4_qre"),
                ])
                .rate(0.25),
            )
            .at(6.0),
            LineDefinition::computed(
                "7",
                "Incremental QRE (line 1 minus line 6, but not less than zero)",
                "fl_incremental_qre",
                field("fl_current_year_qre")
                    .minus(field("fl_base_amount"))
                    .floor_zero(),
            )
            .at(7.0),
            LineDefinition::computed(
                "8",
                "Florida R&D credit before limitations (line 7 x 10%)",
                "fl_credit_before_limits",
                field("fl_incremental_qre").rate(0.10),
            )
            .at(8.0),
            LineDefinition::input(
                "9",
                "Allocated credit amount (after $9M statewide cap and proration)",
                "fl_allocated_credit",
            )
            .with_constraints(LineConstraints {
                min: Some(0.0),
                max: None,
                required: true,
            })
            .at(9.0),
            LineDefinition::computed(
                "10",
                "Final Florida R&D credit (lesser of line 8 or allocated amount)",
                "fl_credit",
                lesser(field("fl_credit_before_limits"), field("fl_allocated_credit")),
            )
            .at(10.0),
        ],
    )
}
