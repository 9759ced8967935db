use super::{fixed_base_lines, JurisdictionConfig};
use crate::credits::domain::{EntityType, Method};
use crate::credits::forms::FormDefinition;
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "NY",
        "New York",
        CreditMetadata::new(0.09, CreditType::Incremental, "NY Form CT-3")
            .carryforward(15)
            .fallback_rate(0.09),
    )
    .with_form(FormDefinition::sequential(
        "NY Form CT-3 - Research and Development Credit",
        Method::Standard,
        "ny_credit",
        fixed_base_lines("ny", 0.09, "9%", "ny_credit"),
    ))
    .with_rules(vec![
        ValidationRule::max_credit_of_liability(
            50.0,
            "Credit cannot exceed 50% of New York tax liability",
        ),
        ValidationRule::carryforward(15, "Credit can be carried forward for up to 15 years"),
        ValidationRule::entity_restriction(
            [EntityType::CCorporation],
            "Credit available only to corporations",
        ),
    ])
    .with_notes([
        "New York uses a fixed-base percentage calculation similar to the federal credit.",
        "Most taxpayers use a 3% fixed-base percentage unless they qualify for a higher rate.",
    ])
}
