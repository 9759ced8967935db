use super::{qre_input_lines, total_of_qre_inputs, JurisdictionConfig};
use crate::credits::domain::Method;
use crate::credits::forms::{constant, field, sum, when, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Pennsylvania Research and Development Tax Credit.
pub(super) fn config() -> JurisdictionConfig {
    let mut lines = qre_input_lines();
    lines.extend([
        LineDefinition::computed(
            "1",
            "Pennsylvania qualified research expenses for the current year",
            "pa_current_year_qre",
            total_of_qre_inputs(),
        ),
        LineDefinition::input("2", "Pennsylvania QRE for 1st prior year", "pa_prior_year_1_qre"),
        LineDefinition::input("3", "Pennsylvania QRE for 2nd prior year", "pa_prior_year_2_qre"),
        LineDefinition::input("4", "Pennsylvania QRE for 3rd prior year", "pa_prior_year_3_qre"),
        LineDefinition::input("5", "Pennsylvania QRE for 4th prior year", "pa_prior_year_4_qre"),
        LineDefinition::computed(
            "6",
            "Base amount (average of lines 2-5)",
            "pa_base_amount",
            sum([
                field("pa_prior_year_1_qre"),
                field("pa_prior_year_2_qre"),
                field("pa_prior_year_3_qre"),
                field("pa_prior_year_4_qre"),
            ])
            .divided_by(constant(4.0)),
        ),
        LineDefinition::computed(
            "7",
            "Incremental QRE (line 1 - line 6, but not less than zero)",
            "pa_incremental_qre",
            field("pa_current_year_qre")
                .minus(field("pa_base_amount"))
                .floor_zero(),
        ),
        LineDefinition::input(
            "8",
            "Small business (assets under $5 million)?",
            "pa_small_business",
        )
        .boolean()
        .with_default(0.0),
        LineDefinition::computed(
            "9",
            "Pennsylvania R&D credit (line 7 x 20% for small businesses, otherwise 10%)",
            "pa_credit",
            when(
                field("pa_small_business").gt(constant(0.0)),
                field("pa_incremental_qre").rate(0.20),
                field("pa_incremental_qre").rate(0.10),
            ),
        ),
    ]);

    JurisdictionConfig::new(
        "PA",
        "Pennsylvania",
        CreditMetadata::new(0.10, CreditType::Incremental, "PA Research and Development Tax Credit")
            .carryforward(15)
            .fallback_rate(0.10),
    )
    .with_form(FormDefinition::sequential(
        "PA Research and Development Tax Credit Application",
        Method::Standard,
        "pa_credit",
        lines,
    ))
    .with_rules(vec![
        ValidationRule::carryforward(
            15,
            "Unused credits may be carried forward for up to 15 years",
        ),
        ValidationRule::note(
            "Applications are due by December 1 and awards are prorated against the statewide cap",
        ),
    ])
}
