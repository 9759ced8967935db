use super::common::*;
use crate::credits::domain::{fields, EntityType, Method, QreBaseData};
use crate::credits::evaluation::{EvaluationResult, LineEvaluator, Overrides};
use crate::credits::registry::JurisdictionConfig;
use crate::credits::validation::{
    RuleKind, Severity, ValidationEngine, ValidationResult, ValidationRule,
};

fn validate(config: &JurisdictionConfig, base: &QreBaseData, method: Method) -> ValidationResult {
    let evaluated = evaluate(config, base, method);
    ValidationEngine::new().validate(config, base, &evaluated, method)
}

fn evaluate(config: &JurisdictionConfig, base: &QreBaseData, method: Method) -> EvaluationResult {
    let form = config.require_form(method).expect("form exists");
    LineEvaluator::new()
        .evaluate(form, base, &Overrides::new())
        .expect("form evaluates")
}

#[test]
fn entity_restriction_is_a_hard_error() {
    let ct = config("CT");
    let base = base_with_qre(100_000.0, 0.0, 0.0).with_entity_type(EntityType::Partnership);

    let result = validate(&ct, &base, Method::Standard);

    assert!(!result.is_valid);
    assert_eq!(
        result.errors,
        vec!["Available only to corporations subject to Connecticut Corporation Business Tax"]
    );
}

#[test]
fn unknown_entity_type_only_warns() {
    let ct = config("CT");
    let result = validate(&ct, &base_with_qre(100_000.0, 0.0, 0.0), Method::Standard);

    assert!(result.is_valid);
    assert!(result
        .warnings
        .iter()
        .any(|warning| warning.starts_with("Entity type not on record.")));
}

#[test]
fn max_credit_and_carryforward_are_informational() {
    let ct = config("CT");
    let base = corporate_base(100_000.0).with_extension(fields::TAX_LIABILITY, 100_000.0);
    let result = validate(&ct, &base, Method::Standard);

    assert!(result.is_valid);
    assert_eq!(result.max_credit, Some(50_000.0));
    assert_eq!(result.carryforward_years, Some(15));
    assert!(result
        .warnings
        .contains(&"Maximum credit allowed: $50,000".to_string()));
    assert!(result
        .warnings
        .contains(&"Carryforward limit: 15 years".to_string()));
    assert_eq!(result.apply_ceiling(80_000.0), 50_000.0);
    assert_eq!(result.apply_ceiling(20_000.0), 20_000.0);
}

#[test]
fn rules_scoped_to_a_method_are_skipped_for_the_other() {
    let ct = config("CT");
    let base = QreBaseData {
        avg_gross_receipts: 50_000.0,
        ..corporate_base(100_000.0)
    };
    let threshold = "Minimum $100,000 in gross receipts in the taxable year to qualify";

    let standard = validate(&ct, &base, Method::Standard);
    let alternative = validate(&ct, &base, Method::Alternative);

    assert!(standard.warnings.iter().any(|warning| warning == threshold));
    assert!(!alternative.warnings.iter().any(|warning| warning == threshold));
    assert!(standard.is_valid && alternative.is_valid);
}

#[test]
fn gross_receipts_threshold_ignores_missing_history() {
    let ga = config("GA");
    let threshold = "Minimum $100,000 in gross receipts in the taxable year to qualify";

    let no_history = validate(&ga, &corporate_base(100_000.0), Method::Standard);
    assert!(!no_history.warnings.iter().any(|warning| warning == threshold));

    let small = QreBaseData {
        avg_gross_receipts: 60_000.0,
        ..corporate_base(100_000.0)
    };
    let result = validate(&ga, &small, Method::Standard);
    assert!(result.warnings.iter().any(|warning| warning == threshold));
    assert!(result.is_valid);
}

#[test]
fn conditional_rules_apply_only_when_their_predicate_holds() {
    let ct = config("CT");
    let workforce = "Credit reduction applies if workforce is reduced and expenses exceed $200 million";

    let modest = validate(&ct, &corporate_base(1_000_000.0), Method::Standard);
    assert!(!modest.warnings.iter().any(|warning| warning == workforce));

    let large = validate(&ct, &corporate_base(250_000_000.0), Method::Standard);
    assert!(large.warnings.iter().any(|warning| warning == workforce));
}

#[test]
fn liability_ceiling_reads_base_extensions() {
    let il = config("IL");

    let without = validate(&il, &corporate_base(1_000_000.0), Method::Standard);
    assert_eq!(without.max_credit, None);
    assert!(without
        .warnings
        .iter()
        .any(|warning| warning.contains("ceiling not computed")));

    let with_liability =
        corporate_base(1_000_000.0).with_extension(fields::TAX_LIABILITY, 40_000.0);
    let result = validate(&il, &with_liability, Method::Standard);
    assert_eq!(result.max_credit, Some(20_000.0));
    let credit = evaluate(&il, &with_liability, Method::Standard).credit();
    assert!(credit > 20_000.0);
    assert_eq!(result.apply_ceiling(credit), 20_000.0);
}

#[test]
fn liability_ceilings_are_measured_against_tax_liability() {
    let base = QreBaseData {
        avg_gross_receipts: 10_000_000.0,
        ..corporate_base(1_000_000.0)
    }
    .with_extension(fields::TAX_LIABILITY, 10_000.0);

    for (code, expected) in [
        ("CT", 5_000.0),
        ("FL", 5_000.0),
        ("GA", 5_000.0),
        ("IL", 5_000.0),
        ("ND", 10_000.0),
        ("NY", 5_000.0),
    ] {
        let result = validate(&config(code), &base, Method::Standard);
        assert_eq!(result.max_credit, Some(expected), "{code} ceiling");
    }

    let major = corporate_base(6_000_000.0).with_extension(fields::TAX_LIABILITY, 10_000.0);
    let va = validate(&config("VA"), &major, Method::Standard);
    assert_eq!(va.max_credit, Some(7_500.0));
}

#[test]
fn apportionment_requirement_needs_a_positive_factor() {
    let config = flat_config("XA").with_rules(vec![ValidationRule::apportionment(
        fields::APPORTIONMENT_FACTOR,
        "Apportionment factor is required for multistate filers",
    )]);

    let missing = validate(&config, &corporate_base(10_000.0), Method::Standard);
    assert!(!missing.is_valid);
    assert_eq!(
        missing.errors,
        vec!["Apportionment factor is required for multistate filers"]
    );

    let apportioned =
        corporate_base(10_000.0).with_extension(fields::APPORTIONMENT_FACTOR, 0.42);
    let result = validate(&config, &apportioned, Method::Standard);
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
}

#[test]
fn custom_error_rules_invalidate_and_lowest_ceiling_wins() {
    let config = flat_config("XB").with_rules(vec![
        ValidationRule::max_credit(50.0, "half"),
        ValidationRule::max_credit(10.0, "tenth"),
        ValidationRule::new(
            RuleKind::Custom {
                severity: Severity::Error,
            },
            "Credit suspended for this year",
        )
        .only_for(Method::Standard),
    ]);

    let result = validate(&config, &corporate_base(100_000.0), Method::Standard);

    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["Credit suspended for this year"]);
    assert_eq!(result.max_credit, Some(10_000.0));
}

#[test]
fn validation_leaves_inputs_untouched() {
    let ct = config("CT");
    let base = corporate_base(100_000.0);
    let evaluated = evaluate(&ct, &base, Method::Standard);
    let (base_before, evaluated_before) = (base.clone(), evaluated.clone());

    ValidationEngine::new().validate(&ct, &base, &evaluated, Method::Standard);

    assert_eq!(base, base_before);
    assert_eq!(evaluated, evaluated_before);
}
