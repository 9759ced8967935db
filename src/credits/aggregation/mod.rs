//! QRE Aggregator: rolls raw expense entries and gross-receipts history up
//! into one [`QreBaseData`] snapshot per business year.

mod parser;

pub use parser::{
    read_entries, read_entries_from_path, read_gross_receipts, read_gross_receipts_from_path,
    EntryImportError,
};

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::domain::{EntityType, GrossReceiptsRecord, QreBaseData, QreCategory, QreEntry};
use crate::config::AggregationConfig;

/// Strictly-prior years averaged into `avg_gross_receipts` unless configured.
pub const DEFAULT_LOOKBACK_YEARS: usize = 3;

#[derive(Debug, Clone)]
pub struct QreAggregator {
    business_year: i32,
    lookback_years: usize,
    entity_type: Option<EntityType>,
    base_period_amount: f64,
    basic_research_payments: f64,
    extensions: BTreeMap<String, f64>,
}

impl QreAggregator {
    pub fn new(business_year: i32) -> Self {
        Self {
            business_year,
            lookback_years: DEFAULT_LOOKBACK_YEARS,
            entity_type: None,
            base_period_amount: 0.0,
            basic_research_payments: 0.0,
            extensions: BTreeMap::new(),
        }
    }

    pub fn from_config(business_year: i32, config: &AggregationConfig) -> Self {
        Self::new(business_year).with_lookback_years(config.gross_receipts_lookback_years)
    }

    /// Window of prior years averaged for gross receipts; at least one.
    pub fn with_lookback_years(mut self, years: usize) -> Self {
        self.lookback_years = years.max(1);
        self
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn with_base_period_amount(mut self, amount: f64) -> Self {
        self.base_period_amount = amount;
        self
    }

    pub fn with_basic_research_payments(mut self, amount: f64) -> Self {
        self.basic_research_payments = amount;
        self
    }

    /// Jurisdiction-specific input carried through to the snapshot, e.g. an
    /// apportionment factor.
    pub fn with_extension(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    pub fn business_year(&self) -> i32 {
        self.business_year
    }

    /// Sums qualified amounts per category and rounds each sum to whole
    /// units. An empty entry set yields an all-zero snapshot.
    pub fn aggregate(
        &self,
        entries: &[QreEntry],
        gross_receipts: &[GrossReceiptsRecord],
    ) -> QreBaseData {
        let mut totals: BTreeMap<QreCategory, f64> = BTreeMap::new();
        for entry in entries {
            if !entry.calculated_qre.is_finite() {
                warn!(
                    business_year = self.business_year,
                    category = entry.category.label(),
                    name = %entry.name,
                    "skipping QRE entry with non-finite amount"
                );
                continue;
            }
            *totals.entry(entry.category).or_insert(0.0) += entry.calculated_qre;
        }
        let total = |category: QreCategory| totals.get(&category).copied().unwrap_or(0.0).round();

        let snapshot = QreBaseData {
            wages: total(QreCategory::Wage),
            supplies: total(QreCategory::Supply),
            contract_research: total(QreCategory::Contractor),
            computer_leases: total(QreCategory::ComputerLease),
            avg_gross_receipts: self.average_gross_receipts(gross_receipts),
            base_period_amount: self.base_period_amount,
            basic_research_payments: self.basic_research_payments,
            entity_type: self.entity_type,
            extensions: self.extensions.clone(),
        };

        debug!(
            business_year = self.business_year,
            entries = entries.len(),
            total_qre = snapshot.total_qre(),
            avg_gross_receipts = snapshot.avg_gross_receipts,
            "aggregated QRE base data"
        );
        snapshot
    }

    /// Unweighted mean of the latest `lookback_years` years strictly before
    /// the business year. Several records for one year are summed first.
    fn average_gross_receipts(&self, records: &[GrossReceiptsRecord]) -> f64 {
        let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
        for record in records {
            if record.year >= self.business_year || !record.gross_receipts.is_finite() {
                continue;
            }
            *by_year.entry(record.year).or_insert(0.0) += record.gross_receipts;
        }

        let recent: Vec<f64> = by_year
            .values()
            .rev()
            .take(self.lookback_years)
            .copied()
            .collect();
        if recent.is_empty() {
            return 0.0;
        }
        (recent.iter().sum::<f64>() / recent.len() as f64).round()
    }
}
