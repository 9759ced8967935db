use crate::config::AggregationConfig;
use crate::credits::aggregation::QreAggregator;
use crate::credits::domain::{
    fields, EntityType, GrossReceiptsRecord, QreBaseData, QreCategory, QreEntry,
};

fn receipts(pairs: &[(i32, f64)]) -> Vec<GrossReceiptsRecord> {
    pairs
        .iter()
        .map(|&(year, gross_receipts)| GrossReceiptsRecord {
            year,
            gross_receipts,
        })
        .collect()
}

#[test]
fn sums_each_category_then_rounds() {
    let entries = vec![
        QreEntry::qualified(QreCategory::Wage, "Engineer A", 12.4),
        QreEntry::qualified(QreCategory::Wage, "Engineer B", 12.6),
        QreEntry::qualified(QreCategory::Supply, "Reagents", 0.3),
        QreEntry::qualified(QreCategory::Supply, "Filters", 0.3),
        QreEntry::new(QreCategory::Contractor, "Lab partner", 10_000.0, 65.0),
        QreEntry::qualified(QreCategory::ComputerLease, "Cloud cluster", 1_499.5),
    ];

    let base = QreAggregator::new(2024).aggregate(&entries, &[]);

    assert_eq!(base.wages, 25.0);
    assert_eq!(base.supplies, 1.0);
    assert_eq!(base.contract_research, 6_500.0);
    assert_eq!(base.computer_leases, 1_500.0);
    assert_eq!(base.total_qre(), 6_526.0);
}

#[test]
fn empty_input_is_an_all_zero_snapshot() {
    let base = QreAggregator::new(2024).aggregate(&[], &[]);
    assert_eq!(base, QreBaseData::zero());
}

#[test]
fn averages_latest_strictly_prior_years() {
    let history = receipts(&[
        (2019, 9_000_000.0),
        (2020, 1_000_000.0),
        (2021, 2_000_000.0),
        (2022, 2_500_000.0),
        (2022, 500_000.0),
        (2023, 4_000_000.0),
        (2024, 50_000_000.0),
    ]);

    let base = QreAggregator::new(2024).aggregate(&[], &history);

    // 2021, 2022 (two records), 2023
    assert_eq!(base.avg_gross_receipts, 3_000_000.0);
}

#[test]
fn short_history_averages_what_exists_and_rounds() {
    let history = receipts(&[(2022, 1_000_000.0), (2023, 1_000_001.0)]);
    let base = QreAggregator::new(2024).aggregate(&[], &history);
    assert_eq!(base.avg_gross_receipts, 1_000_001.0);

    let future_only = receipts(&[(2024, 1_000_000.0), (2025, 2_000_000.0)]);
    let base = QreAggregator::new(2024).aggregate(&[], &future_only);
    assert_eq!(base.avg_gross_receipts, 0.0);
}

#[test]
fn lookback_window_comes_from_config() {
    let history = receipts(&[(2021, 3_000_000.0), (2022, 2_000_000.0), (2023, 1_000_000.0)]);
    let config = AggregationConfig {
        gross_receipts_lookback_years: 1,
    };

    let base = QreAggregator::from_config(2024, &config).aggregate(&[], &history);
    assert_eq!(base.avg_gross_receipts, 1_000_000.0);
}

#[test]
fn non_finite_entries_are_skipped() {
    let entries = vec![
        QreEntry::qualified(QreCategory::Wage, "Engineer", 1_000.0),
        QreEntry::qualified(QreCategory::Wage, "Corrupt row", f64::NAN),
    ];
    let base = QreAggregator::new(2024).aggregate(&entries, &[]);
    assert_eq!(base.wages, 1_000.0);
}

#[test]
fn carries_builder_inputs_into_the_snapshot() {
    let base = QreAggregator::new(2024)
        .with_entity_type(EntityType::SCorporation)
        .with_base_period_amount(40_000.0)
        .with_basic_research_payments(90_000.0)
        .with_extension(fields::APPORTIONMENT_FACTOR, 0.35)
        .aggregate(&[], &[]);

    assert_eq!(base.entity_type, Some(EntityType::SCorporation));
    assert_eq!(base.base_period_amount, 40_000.0);
    assert_eq!(base.basic_research_payments, 90_000.0);
    assert_eq!(base.extensions.get(fields::APPORTIONMENT_FACTOR), Some(&0.35));
}
