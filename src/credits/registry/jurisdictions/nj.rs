use super::{fixed_base_lines, JurisdictionConfig};
use crate::credits::domain::{EntityType, Method};
use crate::credits::forms::FormDefinition;
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "NJ",
        "New Jersey",
        CreditMetadata::new(0.10, CreditType::Incremental, "NJ Form 306").carryforward(7),
    )
    .with_form(FormDefinition::sequential(
        "NJ Form 306 - Credit for Increased Research Activities",
        Method::Standard,
        "nj_credit",
        fixed_base_lines("nj", 0.10, "10%", "nj_credit"),
    ))
    .with_rules(vec![
        ValidationRule::carryforward(7, "Unused credits may be carried forward for up to 7 years"),
        ValidationRule::entity_restriction(
            [EntityType::CCorporation, EntityType::SCorporation],
            "Available to taxpayers subject to the Corporation Business Tax",
        ),
        ValidationRule::note(
            "Credit may not reduce tax below the statutory minimum or by more than 50% of liability",
        ),
    ])
}
