use super::{fixed_base_lines, total_of_qre_inputs, JurisdictionConfig};
use crate::credits::domain::{fields, EntityType, Method};
use crate::credits::forms::{constant, field, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

const SIMPLIFIED_RECEIPTS_LIMIT: f64 = 5_000_000.0;

/// Illinois research and development credit (IL-1120 Schedule 1299-D).
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "IL",
        "Illinois",
        CreditMetadata::new(0.065, CreditType::Incremental, "IL Form IL-1120")
            .carryforward(5)
            .fallback_rate(0.065),
    )
    .with_form(FormDefinition::sequential(
        "IL Form IL-1120 - Research and Development Credit",
        Method::Standard,
        "il_credit",
        fixed_base_lines("il", 0.065, "6.5%", "il_credit"),
    ))
    .with_form(simplified_method())
    .with_rules(vec![
        ValidationRule::max_credit_of_liability(
            50.0,
            "Credit cannot exceed 50% of Illinois tax liability",
        ),
        ValidationRule::carryforward(5, "Credit can be carried forward for up to 5 years"),
        ValidationRule::entity_restriction(
            [EntityType::CCorporation],
            "Credit available only to corporations",
        ),
        ValidationRule::note(
            "Simplified method available only for businesses with average gross receipts under $5M",
        )
        .only_for(Method::Alternative),
    ])
    .with_notes([
        "The credit is 6.5% of incremental qualified research expenses.",
        "Credit can be used to offset up to 50% of Illinois income tax liability.",
    ])
}

fn simplified_method() -> FormDefinition {
    FormDefinition::sequential(
        "IL Simplified Method",
        Method::Alternative,
        "il_alt_credit",
        vec![
            LineDefinition::computed(
                "1",
                "Total qualified research expenses",
                "il_alt_qre",
                total_of_qre_inputs(),
            ),
            LineDefinition::computed(
                "2",
                "Simplified credit (line 1 x 3.25%)",
                "il_alt_credit",
                field("il_alt_qre").rate(0.0325),
            ),
        ],
    )
    .available_when(field(fields::AVG_GROSS_RECEIPTS).lt(constant(SIMPLIFIED_RECEIPTS_LIMIT)))
}
