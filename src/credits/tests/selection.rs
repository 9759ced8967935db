use std::collections::BTreeMap;

use super::common::*;
use crate::credits::comparison::{MethodComparator, MethodOverrides};
use crate::credits::domain::{Method, QreBaseData};
use crate::credits::evaluation::{EvaluationResult, LineEvaluator, Overrides};
use crate::credits::forms::{constant, field, ConfigError, LineDefinition};
use crate::credits::registry::JurisdictionRegistry;
use crate::credits::selection::{BestCreditSelector, CreditSelection};
use crate::credits::validation::ValidationRule;

#[test]
fn totals_best_credit_per_jurisdiction_and_skips_unknown_codes() {
    let registry = registry();
    let base = corporate_base(100_000.0);

    let selection =
        BestCreditSelector::new().select_best(&registry, ["CT", "GA", "ZZ", "ct"], &base);

    assert_eq!(selection.credits.len(), 2);
    assert!(selection.failures.is_empty());

    let ct = selection.credit_for("ct").expect("CT selected");
    assert_eq!(ct.method, Method::Alternative);
    assert_eq!(ct.credit, 20_000.0);
    assert!(ct.validation.is_valid);

    let ga = selection.credit_for("GA").expect("GA selected");
    assert_eq!(ga.method, Method::Standard);
    assert_close(ga.credit, 10_000.0);

    assert_close(selection.total, 30_000.0);
    assert!(selection.credit_for("ZZ").is_none());
}

#[test]
fn empty_request_selects_nothing() {
    let selection = BestCreditSelector::new().select_best(
        &registry(),
        Vec::<String>::new(),
        &QreBaseData::zero(),
    );
    assert!(selection.credits.is_empty());
    assert_eq!(selection.total, 0.0);
}

#[test]
fn defective_jurisdiction_is_reported_without_blocking_others() {
    let mut broken = flat_config("XC");
    if let Some(form) = broken.forms.get_mut(&Method::Standard) {
        form.lines.insert(
            0,
            LineDefinition::computed("0", "Reads ahead", "early", field("flat_credit")).at(0.5),
        );
    }
    let registry =
        JurisdictionRegistry::from_configs(vec![broken, flat_config("XD")]).expect("unique codes");

    let selection =
        BestCreditSelector::new().select_best(&registry, ["XC", "XD"], &corporate_base(50_000.0));

    assert_eq!(selection.credits.len(), 1);
    assert_close(selection.total, 5_000.0);
    match selection.failures.as_slice() {
        [failure] => {
            assert_eq!(failure.code, "XC");
            assert!(matches!(failure.error, ConfigError::ForwardReference { .. }));
        }
        other => panic!("expected one failure, got {other:?}"),
    }
}

#[test]
fn misspelled_rule_field_fails_only_its_jurisdiction() {
    let typo = flat_config("XF").with_rules(vec![
        ValidationRule::note("Large filer")
            .when(field("wgaes").gt(constant(1_000_000.0))),
    ]);
    let registry =
        JurisdictionRegistry::from_configs(vec![typo, flat_config("XG")]).expect("unique codes");

    let selection =
        BestCreditSelector::new().select_best(&registry, ["XF", "XG"], &corporate_base(50_000.0));

    assert!(selection.credit_for("XG").is_some());
    match selection.failures.as_slice() {
        [failure] => match &failure.error {
            ConfigError::DanglingRuleReference { jurisdiction, field, .. } => {
                assert_eq!(jurisdiction, "XF");
                assert_eq!(field, "wgaes");
            }
            other => panic!("expected dangling rule reference, got {other:?}"),
        },
        other => panic!("expected one failure, got {other:?}"),
    }
}

#[test]
fn overrides_are_matched_by_jurisdiction_code() {
    let registry = registry();
    let mut per_method = MethodOverrides::new();
    per_method.insert(
        Method::Alternative,
        Overrides::from([("ct_alt_prior_year_expenses".to_string(), 100_000.0)]),
    );
    let overrides = BTreeMap::from([("ct".to_string(), per_method)]);

    let selection = BestCreditSelector::new().select_best_with_overrides(
        &registry,
        ["CT"],
        &corporate_base(100_000.0),
        &overrides,
    );

    let ct = selection.credit_for("CT").expect("CT selected");
    assert_eq!(ct.comparison.alternative_credit, Some(0.0));
    assert_eq!(ct.credit, 0.0);
    assert_eq!(ct.method, Method::Standard);
}

#[test]
fn capped_credit_applies_rule_ceiling() {
    let limited = flat_config("XE").with_rules(vec![ValidationRule::max_credit(
        5.0,
        "Credit limited to 5% of QRE",
    )]);
    let registry = JurisdictionRegistry::from_configs(vec![limited]).expect("registry");

    let selection =
        BestCreditSelector::new().select_best(&registry, ["XE"], &corporate_base(200_000.0));
    let credit = selection.credit_for("XE").expect("selected");

    assert_close(credit.credit, 20_000.0);
    assert_close(credit.capped_credit(), 10_000.0);
    assert_close(selection.capped_total(), 10_000.0);
}

#[test]
fn engine_types_can_be_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<JurisdictionRegistry>();
    assert_send_sync::<LineEvaluator>();
    assert_send_sync::<MethodComparator>();
    assert_send_sync::<BestCreditSelector>();
    assert_send_sync::<EvaluationResult>();
    assert_send_sync::<CreditSelection>();
}

#[test]
fn concurrent_selections_share_one_registry() {
    let registry = registry();
    let base = corporate_base(100_000.0);
    let selector = BestCreditSelector::new();
    let codes = ["CT", "GA"];

    let totals: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| selector.select_best(&registry, codes, &base)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("selection thread").total)
            .collect()
    });

    for total in totals {
        assert_close(total, 30_000.0);
    }
}
