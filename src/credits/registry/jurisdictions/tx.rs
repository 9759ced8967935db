use super::{qre_input_lines, total_of_qre_inputs, JurisdictionConfig};
use crate::credits::domain::Method;
use crate::credits::forms::{constant, field, sum, when, Condition, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

/// Texas franchise tax research and development credit (Tax Code ch. 171, subch. M).
pub(super) fn config() -> JurisdictionConfig {
    let prior_years = ["tx_prior_year_1_qre", "tx_prior_year_2_qre", "tx_prior_year_3_qre"];

    let mut lines = qre_input_lines();
    lines.extend([
        LineDefinition::computed(
            "1",
            "Texas qualified research expenses for the current period",
            "tx_current_qre",
            total_of_qre_inputs(),
        ),
        LineDefinition::input("2", "Texas QRE for 1st prior period", prior_years[0]),
        LineDefinition::input("3", "Texas QRE for 2nd prior period", prior_years[1]),
        LineDefinition::input("4", "Texas QRE for 3rd prior period", prior_years[2]),
        LineDefinition::computed(
            "5",
            "Average QRE for the 3 preceding periods",
            "tx_average_prior_qre",
            sum(prior_years.map(field)).divided_by(constant(3.0)),
        ),
        LineDefinition::computed(
            "6",
            "Multiply line 5 by 50%",
            "tx_base_amount",
            field("tx_average_prior_qre").rate(0.5),
        ),
        LineDefinition::computed(
            "7",
            "Subtract line 6 from line 1. If less than zero, enter 0",
            "tx_excess_qre",
            field("tx_current_qre").minus(field("tx_base_amount")).floor_zero(),
        ),
        LineDefinition::computed(
            "8",
            "Multiply line 7 by 5%",
            "tx_standard_credit",
            field("tx_excess_qre").rate(0.05),
        ),
        LineDefinition::computed(
            "9",
            "No QRE in a preceding period: multiply line 1 by 2.5%",
            "tx_no_history_credit",
            field("tx_current_qre").rate(0.025),
        ),
        LineDefinition::computed(
            "10",
            "Texas R&D credit (line 9 if any of lines 2-4 is zero, otherwise line 8)",
            "tx_credit",
            when(
                Condition::Any(
                    prior_years
                        .iter()
                        .map(|key| field(*key).lte(constant(0.0)))
                        .collect(),
                ),
                field("tx_no_history_credit"),
                field("tx_standard_credit"),
            ),
        ),
    ]);

    JurisdictionConfig::new(
        "TX",
        "Texas",
        CreditMetadata::new(0.05, CreditType::Incremental, "TX Form 05-178")
            .carryforward(20)
            .fallback_rate(0.05),
    )
    .with_form(FormDefinition::sequential(
        "TX Franchise Tax Research and Development Activities Credit",
        Method::Standard,
        "tx_credit",
        lines,
    ))
    .with_rules(vec![
        ValidationRule::carryforward(
            20,
            "Unused credits may be carried forward for up to 20 years",
        ),
        ValidationRule::note(
            "Credit is claimed against franchise tax; the sales tax exemption is an alternative election",
        ),
    ])
}
