use crate::credits::domain::{fields, EntityType, Method, QreBaseData};
use crate::credits::forms::{field, FormDefinition, LineDefinition};
use crate::credits::registry::{
    CreditMetadata, CreditType, JurisdictionConfig, JurisdictionRegistry,
};

pub(super) fn registry() -> JurisdictionRegistry {
    JurisdictionRegistry::standard()
}

pub(super) fn config(code: &str) -> JurisdictionConfig {
    registry()
        .lookup(code)
        .cloned()
        .unwrap_or_else(|| panic!("{code} is in the built-in catalog"))
}

pub(super) fn base_with_qre(wages: f64, supplies: f64, contract_research: f64) -> QreBaseData {
    QreBaseData {
        wages,
        supplies,
        contract_research,
        ..QreBaseData::zero()
    }
}

pub(super) fn corporate_base(wages: f64) -> QreBaseData {
    base_with_qre(wages, 0.0, 0.0).with_entity_type(EntityType::CCorporation)
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// 6.5% of QRE, limited to $300,000.
pub(super) fn capped_form() -> FormDefinition {
    FormDefinition::sequential(
        "Capped Credit",
        Method::Standard,
        "capped_credit",
        vec![
            LineDefinition::input("1", "Incremental QRE", "incremental_qre"),
            LineDefinition::computed(
                "2",
                "Computed credit (line 1 x 6.5%)",
                "computed_credit",
                field("incremental_qre").rate(0.065),
            ),
            LineDefinition::computed(
                "3",
                "Credit: the lesser of line 2 or $300,000",
                "capped_credit",
                field("computed_credit").capped_at(300_000.0),
            ),
        ],
    )
}

/// Single-form jurisdiction whose credit is 10% of wages.
pub(super) fn flat_config(code: &str) -> JurisdictionConfig {
    JurisdictionConfig::new(
        code,
        format!("Flat {code}"),
        CreditMetadata::new(0.10, CreditType::Flat, format!("{code} Flat Form")),
    )
    .with_form(FormDefinition::sequential(
        format!("{code} Flat Form"),
        Method::Standard,
        "flat_credit",
        vec![LineDefinition::computed(
            "1",
            "Credit (wages x 10%)",
            "flat_credit",
            field(fields::WAGES).rate(0.10),
        )],
    ))
}
