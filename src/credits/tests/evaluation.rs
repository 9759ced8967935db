use super::common::*;
use crate::credits::domain::{fields, Method, QreBaseData};
use crate::credits::evaluation::{DiagnosticKind, LineEvaluator, Overrides};
use crate::credits::forms::{constant, field, ConfigError, FormDefinition, LineDefinition};

fn overrides<const N: usize>(pairs: [(&str, f64); N]) -> Overrides {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[test]
fn fixed_base_credit_follows_the_form_lines() {
    let ga = config("GA");
    let base = QreBaseData {
        avg_gross_receipts: 2_000_000.0,
        ..base_with_qre(1_000_000.0, 0.0, 0.0)
    };

    let result = LineEvaluator::new()
        .evaluate(
            ga.require_form(Method::Standard).expect("GA standard"),
            &base,
            &Overrides::new(),
        )
        .expect("GA evaluates");

    assert_close(result.value("ga_fixed_base_percentage").expect("seeded"), 3.0);
    assert_close(result.value("ga_base_amount").expect("computed"), 60_000.0);
    assert_close(result.value("ga_incremental_qre").expect("computed"), 940_000.0);
    assert_close(result.credit(), 94_000.0);
    assert!(!result.has_diagnostics());
}

#[test]
fn overrides_win_over_base_data_but_not_over_calcs() {
    let ga = config("GA");
    let form = ga.require_form(Method::Standard).expect("GA standard");
    let base = base_with_qre(100_000.0, 0.0, 0.0);

    let result = LineEvaluator::new()
        .evaluate(
            form,
            &base,
            &overrides([(fields::WAGES, 200_000.0), ("ga_qre", 5.0)]),
        )
        .expect("GA evaluates");

    assert_close(result.value(fields::WAGES).expect("seeded"), 200_000.0);
    assert_close(result.value("ga_qre").expect("computed"), 200_000.0);
    assert_close(result.credit(), 20_000.0);
}

#[test]
fn evaluation_copies_base_data() {
    let base = base_with_qre(500_000.0, 25_000.0, 10_000.0);
    let snapshot = base.clone();
    let ca = config("CA");

    for form in ca.forms.values() {
        LineEvaluator::new()
            .evaluate(form, &base, &overrides([(fields::WAGES, 1.0)]))
            .expect("CA evaluates");
    }

    assert_eq!(base, snapshot);
}

#[test]
fn failing_line_is_zeroed_and_later_lines_still_run() {
    let form = FormDefinition::sequential(
        "Division",
        Method::Standard,
        "credit",
        vec![
            LineDefinition::input("1", "Prior-year QRE", "prior"),
            LineDefinition::computed(
                "2",
                "Growth ratio",
                "growth",
                field(fields::WAGES).divided_by(field("prior")),
            ),
            LineDefinition::computed(
                "3",
                "Credit",
                "credit",
                field(fields::WAGES).rate(0.1).plus(field("growth")),
            ),
        ],
    );

    let result = LineEvaluator::new()
        .evaluate(&form, &corporate_base(1_000.0), &Overrides::new())
        .expect("form is well formed");

    assert_eq!(result.value("growth"), Some(0.0));
    assert_close(result.credit(), 100.0);
    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::CalculationFailed);
    assert_eq!(diagnostic.field, "growth");
    assert!(diagnostic.message.contains("division by zero"));
}

#[test]
fn constraints_report_without_clamping() {
    let ga = config("GA");
    let form = ga.require_form(Method::Standard).expect("GA standard");

    let result = LineEvaluator::new()
        .evaluate(
            form,
            &base_with_qre(100_000.0, 0.0, 0.0),
            &overrides([("ga_fixed_base_percentage", 20.0)]),
        )
        .expect("GA evaluates");

    assert_eq!(result.value("ga_fixed_base_percentage"), Some(20.0));
    match result.diagnostics.as_slice() {
        [diagnostic] => {
            assert_eq!(diagnostic.kind, DiagnosticKind::AboveMaximum);
            assert_eq!(diagnostic.line, "3");
        }
        other => panic!("expected one above-maximum diagnostic, got {other:?}"),
    }
}

#[test]
fn required_input_flags_until_supplied() {
    let fl = config("FL");
    let form = fl.require_form(Method::Standard).expect("FL standard");
    let base = base_with_qre(1_000_000.0, 0.0, 0.0);

    let missing = LineEvaluator::new()
        .evaluate(form, &base, &Overrides::new())
        .expect("FL evaluates");
    assert!(missing
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.kind == DiagnosticKind::MissingRequired
            && diagnostic.field == "fl_allocated_credit"));
    assert_eq!(missing.credit(), 0.0);

    let allocated = LineEvaluator::new()
        .evaluate(form, &base, &overrides([("fl_allocated_credit", 40_000.0)]))
        .expect("FL evaluates");
    assert!(!allocated.has_diagnostics());
    assert_close(allocated.value("fl_credit_before_limits").expect("computed"), 100_000.0);
    assert_close(allocated.credit(), 40_000.0);
}

#[test]
fn equal_sort_orders_keep_declaration_order() {
    let form = FormDefinition::new(
        "Ties",
        Method::Standard,
        "credit",
        vec![
            LineDefinition::computed(
                "1",
                "Doubled wages",
                "doubled",
                field(fields::WAGES).rate(2.0),
            )
            .at(1.0),
            LineDefinition::computed(
                "2",
                "Credit",
                "credit",
                field("doubled").plus(constant(1.0)),
            )
            .at(1.0),
        ],
    );

    let result = LineEvaluator::new()
        .evaluate(&form, &base_with_qre(10.0, 0.0, 0.0), &Overrides::new())
        .expect("evaluates");
    assert_close(result.credit(), 21.0);
}

#[test]
fn malformed_form_is_a_config_error() {
    let mut form = capped_form();
    form.lines.swap(1, 2);
    form.lines[1].sort_order = 2.0;
    form.lines[2].sort_order = 3.0;

    match LineEvaluator::new().evaluate(&form, &QreBaseData::zero(), &Overrides::new()) {
        Err(ConfigError::ForwardReference { field, .. }) => assert_eq!(field, "computed_credit"),
        other => panic!("expected forward reference, got {other:?}"),
    }
}

#[test]
fn entity_rate_tables_follow_the_filer() {
    let ca = config("CA");
    let form = ca.require_form(Method::Standard).expect("CA standard");
    let evaluator = LineEvaluator::new();

    let corporate = evaluator
        .evaluate(form, &corporate_base(1_000_000.0), &Overrides::new())
        .expect("CA evaluates");
    let unknown = evaluator
        .evaluate(form, &base_with_qre(1_000_000.0, 0.0, 0.0), &Overrides::new())
        .expect("CA evaluates");

    assert!(corporate.credit() > unknown.credit());
}
