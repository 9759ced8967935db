use super::{total_of_qre_inputs, JurisdictionConfig, CORPORATIONS_AND_PARTNERSHIPS};
use crate::credits::domain::{fields, Method};
use crate::credits::forms::{constant, field, when, FormDefinition, LineDefinition};
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

const MAJOR_THRESHOLD: f64 = 5_000_000.0;

/// Virginia Form RDC (minor credit) and Form MRD (major credit). Only one of
/// the two is claimed, selected by the $5M current-year QRE threshold.
pub(super) fn config() -> JurisdictionConfig {
    JurisdictionConfig::new(
        "VA",
        "Virginia",
        CreditMetadata::new(
            0.15,
            CreditType::Tiered,
            "VA Form RDC / Form MRD - Application Required",
        )
        .carryforward(10)
        .refundable()
        .fallback_rate(0.15),
    )
    .with_form(minor_or_major_credit())
    .with_rules(vec![
        ValidationRule::note(
            "QRE amount determines which credit applies: Minor (<=$5M) or Major (>$5M)",
        ),
        ValidationRule::note(
            "Applications must be submitted by September 1st for both Minor and Major credits",
        ),
        ValidationRule::note("Minor R&D Credit is refundable - can receive cash refund")
            .when(total_of_qre_inputs().lte(constant(MAJOR_THRESHOLD))),
        ValidationRule::max_credit_of_liability(
            75.0,
            "Major credit limited to 75% of tax liability",
        )
        .when(total_of_qre_inputs().gt(constant(MAJOR_THRESHOLD))),
        ValidationRule::carryforward(10, "Major credit carries forward 10 years")
            .when(total_of_qre_inputs().gt(constant(MAJOR_THRESHOLD))),
        ValidationRule::entity_restriction(
            CORPORATIONS_AND_PARTNERSHIPS,
            "Available to corporations, S-corporations, LLCs, and partnerships",
        ),
    ])
    .with_notes([
        "Minor credit: 15% of the first $300,000 of incremental QRE (max $45,000), 20% with a Virginia university (max $60,000).",
        "Major credit: 10% of the first $1M of QRE over half the 3-year average plus 5% of the excess (max $300,000).",
    ])
}

fn minor_or_major_credit() -> FormDefinition {
    FormDefinition::new(
        "Form RDC (Minor R&D Credit) / Form MRD (Major R&D Credit)",
        Method::Standard,
        "va_credit",
        vec![
            LineDefinition::input("wages", "Qualified wages", fields::WAGES).at(0.1),
            LineDefinition::input("supplies", "Qualified supplies", fields::SUPPLIES).at(0.2),
            LineDefinition::input("contract", "Contract research", fields::CONTRACT_RESEARCH)
                .at(0.3),
            LineDefinition::computed(
                "1",
                "Total Virginia qualified research expenses for current year",
                "va_current_year_qre",
                total_of_qre_inputs(),
            )
            .at(1.0),
            LineDefinition::input(
                "4",
                "Virginia base amount (minor credit)",
                "va_minor_base_amount",
            )
            .at(4.0),
            LineDefinition::computed(
                "5",
                "Incremental QRE (line 1 - line 4, if positive)",
                "va_minor_incremental_qre",
                field("va_current_year_qre")
                    .minus(field("va_minor_base_amount"))
                    .floor_zero(),
            )
            .at(5.0),
            LineDefinition::computed(
                "6a",
                "Regular minor credit: 15% of first $300,000 of line 5",
                "va_minor_regular_credit",
                field("va_minor_incremental_qre")
                    .capped_at(300_000.0)
                    .rate(0.15),
            )
            .at(6.0),
            LineDefinition::input(
                "6b",
                "University minor credit: 20% of first $300,000 of line 5 (with a Virginia university)",
                "va_minor_university_credit",
            )
            .at(7.0),
            LineDefinition::computed(
                "7",
                "Total minor credit (higher of line 6a or 6b, capped at $45K/$60K)",
                "va_minor_total_credit",
                when(
                    field("va_minor_university_credit").gt(field("va_minor_regular_credit")),
                    field("va_minor_university_credit").capped_at(60_000.0),
                    field("va_minor_regular_credit").capped_at(45_000.0),
                ),
            )
            .at(8.0),
            LineDefinition::input(
                "8",
                "Average Virginia QRE for prior 3 years (major credit)",
                "va_major_average_3_year",
            )
            .at(9.0),
            LineDefinition::computed(
                "9",
                "Major credit base amount (50% of line 8)",
                "va_major_base_amount",
                field("va_major_average_3_year").rate(0.5),
            )
            .at(10.0),
            LineDefinition::computed(
                "10",
                "Major incremental QRE (line 1 - line 9, if positive)",
                "va_major_incremental_qre",
                field("va_current_year_qre")
                    .minus(field("va_major_base_amount"))
                    .floor_zero(),
            )
            .at(11.0),
            LineDefinition::computed(
                "11a",
                "Major credit on first $1M (10%)",
                "va_major_first_tier_credit",
                field("va_major_incremental_qre")
                    .capped_at(1_000_000.0)
                    .rate(0.10),
            )
            .at(12.0),
            LineDefinition::computed(
                "11b",
                "Major credit on excess over $1M (5%)",
                "va_major_second_tier_credit",
                field("va_major_incremental_qre")
                    .minus(constant(1_000_000.0))
                    .floor_zero()
                    .rate(0.05),
            )
            .at(13.0),
            LineDefinition::computed(
                "12",
                "Total major credit (line 11a + 11b, capped at $300K)",
                "va_major_total_credit",
                field("va_major_first_tier_credit")
                    .plus(field("va_major_second_tier_credit"))
                    .capped_at(300_000.0),
            )
            .at(14.0),
            LineDefinition::computed(
                "13",
                "Final Virginia R&D credit (minor or major, not both)",
                "va_credit",
                when(
                    field("va_current_year_qre").lte(constant(MAJOR_THRESHOLD)),
                    field("va_minor_total_credit"),
                    field("va_major_total_credit"),
                ),
            )
            .at(15.0),
        ],
    )
}
