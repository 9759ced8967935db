use super::{fixed_base_lines, JurisdictionConfig, CORPORATIONS};
use crate::credits::domain::{fields, Method};
use crate::credits::forms::{field, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Massachusetts research credit: 10% of excess QRE plus 15% of basic
/// research payments over the base period amount.
pub(super) fn config() -> JurisdictionConfig {
    let mut lines = fixed_base_lines("ma", 0.10, "10%", "ma_qre_credit");
    lines.extend([
        LineDefinition::input(
            "9",
            "Basic research payments to qualified organizations",
            fields::BASIC_RESEARCH_PAYMENTS,
        ),
        LineDefinition::input("10", "Base period amount", fields::BASE_PERIOD_AMOUNT),
        LineDefinition::computed(
            "11",
            "Subtract line 10 from line 9. If less than zero, enter 0",
            "ma_basic_research_excess",
            field(fields::BASIC_RESEARCH_PAYMENTS)
                .minus(field(fields::BASE_PERIOD_AMOUNT))
                .floor_zero(),
        ),
        LineDefinition::computed(
            "12",
            "Multiply line 11 by 15%",
            "ma_basic_research_credit",
            field("ma_basic_research_excess").rate(0.15),
        ),
        LineDefinition::computed(
            "13",
            "Massachusetts research credit: add lines 8 and 12",
            "ma_credit",
            field("ma_qre_credit").plus(field("ma_basic_research_credit")),
        ),
    ]);

    JurisdictionConfig::new(
        "MA",
        "Massachusetts",
        CreditMetadata::new(0.10, CreditType::Incremental, "MA Schedule RC").carryforward(15),
    )
    .with_form(FormDefinition::sequential(
        "MA Schedule RC - Research Credit",
        Method::Standard,
        "ma_credit",
        lines,
    ))
    .with_rules(vec![
        ValidationRule::carryforward(
            15,
            "Unused credits may be carried forward for up to 15 years",
        ),
        ValidationRule::entity_restriction(CORPORATIONS, "Available to corporate excise taxpayers"),
        ValidationRule::note(
            "Credit may offset 100% of the first $25,000 of excise and 75% of the excess",
        ),
    ])
}
