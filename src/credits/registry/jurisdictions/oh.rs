use super::{qre_input_lines, total_of_qre_inputs, JurisdictionConfig};
use crate::credits::domain::Method;
use crate::credits::forms::{constant, field, sum, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Ohio Commercial Activity Tax R&D credit (R.C. 5751.51).
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "OH",
        "Ohio",
        CreditMetadata::new(
            0.07,
            CreditType::Incremental,
            "OH Section 5751.51 (Commercial Activity Tax)",
        )
        .carryforward(7)
        .fallback_rate(0.07),
    )
    .with_form(cat_credit())
    .with_rules(vec![
        ValidationRule::note("Credit applies against Ohio Commercial Activity Tax, NOT income tax"),
        ValidationRule::carryforward(7, "Unused credits may be carried forward for up to 7 years"),
        ValidationRule::note(
            "Credit calculated based on calendar year expenses, regardless of tax year",
        ),
        ValidationRule::note("Research activities must be conducted in Ohio to qualify"),
    ])
    .with_notes([
        "Credit equals 7% of Ohio QRE above the 3-year average base amount",
        "Credit is nonrefundable and cannot reduce the CAT minimum tax",
    ])
}

fn cat_credit() -> FormDefinition {
    let mut lines = qre_input_lines();
    lines.extend([
        LineDefinition::computed(
            "1",
            "Ohio qualified research expenses for current calendar year",
            "oh_current_year_qre",
            total_of_qre_inputs(),
        ),
        LineDefinition::input("2", "Ohio QRE for 1st prior calendar year", "oh_prior_year_1_qre"),
        LineDefinition::input("3", "Ohio QRE for 2nd prior calendar year", "oh_prior_year_2_qre"),
        LineDefinition::input("4", "Ohio QRE for 3rd prior calendar year", "oh_prior_year_3_qre"),
        LineDefinition::computed(
            "5",
            "Average annual Ohio QRE for 3 preceding calendar years",
            "oh_base_amount",
            sum([
                field("oh_prior_year_1_qre"),
                field("oh_prior_year_2_qre"),
                field("oh_prior_year_3_qre"),
            ])
            .divided_by(constant(3.0)),
        ),
        LineDefinition::computed(
            "6",
            "Incremental Ohio QRE (line 1 - line 5, but not less than zero)",
            "oh_incremental_qre",
            field("oh_current_year_qre")
                .minus(field("oh_base_amount"))
                .floor_zero(),
        ),
        LineDefinition::computed(
            "7",
            "Ohio CAT R&D credit (line 6 x 7%)",
            "oh_credit",
            field("oh_incremental_qre").rate(0.07),
        ),
    ]);

    FormDefinition::sequential(
        "OH Commercial Activity Tax R&D Credit",
        Method::Standard,
        "oh_credit",
        lines,
    )
}
