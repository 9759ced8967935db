use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::forms::FieldLookup;

/// Field keys seeded into every data bag from [`QreBaseData`].
pub mod fields {
    pub const WAGES: &str = "wages";
    pub const SUPPLIES: &str = "supplies";
    pub const CONTRACT_RESEARCH: &str = "contract_research";
    pub const COMPUTER_LEASES: &str = "computer_leases";
    pub const AVG_GROSS_RECEIPTS: &str = "avg_gross_receipts";
    pub const BASE_PERIOD_AMOUNT: &str = "base_period_amount";
    pub const BASIC_RESEARCH_PAYMENTS: &str = "basic_research_payments";

    /// Common extension inputs. These are not part of the core snapshot but
    /// several jurisdictions read them when supplied.
    pub const APPORTIONMENT_FACTOR: &str = "apportionment_factor";
    pub const TAX_LIABILITY: &str = "tax_liability";

    pub static CORE: [&str; 7] = [
        WAGES,
        SUPPLIES,
        CONTRACT_RESEARCH,
        COMPUTER_LEASES,
        AVG_GROSS_RECEIPTS,
        BASE_PERIOD_AMOUNT,
        BASIC_RESEARCH_PAYMENTS,
    ];

    pub static EXTENSIONS: [&str; 2] = [APPORTIONMENT_FACTOR, TAX_LIABILITY];

    pub fn is_core(key: &str) -> bool {
        CORE.contains(&key)
    }

    /// Core snapshot fields and the recognised extension inputs.
    pub fn is_base(key: &str) -> bool {
        is_core(key) || EXTENSIONS.contains(&key)
    }
}

/// Calculation method a form implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Standard,
    Alternative,
}

impl Method {
    pub const fn ordered() -> [Self; 2] {
        [Self::Standard, Self::Alternative]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Alternative => "alternative",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    CCorporation,
    SCorporation,
    Partnership,
    Llc,
    Individual,
}

impl EntityType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::CCorporation,
            Self::SCorporation,
            Self::Partnership,
            Self::Llc,
            Self::Individual,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CCorporation => "C Corporation",
            Self::SCorporation => "S Corporation",
            Self::Partnership => "Partnership",
            Self::Llc => "LLC",
            Self::Individual => "Individual",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized entity type `{0}`")]
pub struct UnknownEntityType(pub String);

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    /// Accepts the spellings business records tend to carry
    /// (`"C-Corp"`, `"CCORP"`, `"s_corp"`, `"LLP"`, `"Sole Proprietorship"`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "CCORP" | "CCORPORATION" | "CORP" | "CORPORATION" => Ok(Self::CCorporation),
            "SCORP" | "SCORPORATION" => Ok(Self::SCorporation),
            "LP" | "LLP" | "PARTNERSHIP" => Ok(Self::Partnership),
            "LLC" => Ok(Self::Llc),
            "INDIVIDUAL" | "SOLEPROPRIETOR" | "SOLEPROPRIETORSHIP" => Ok(Self::Individual),
            _ => Err(UnknownEntityType(value.trim().to_string())),
        }
    }
}

/// Expense bucket a QRE entry rolls up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QreCategory {
    Wage,
    Contractor,
    Supply,
    ComputerLease,
}

impl QreCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Wage,
            Self::Contractor,
            Self::Supply,
            Self::ComputerLease,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Wage => "Wages",
            Self::Contractor => "Contract Research",
            Self::Supply => "Supplies",
            Self::ComputerLease => "Computer Leases",
        }
    }

    /// Base-data field the category sums into.
    pub const fn field(self) -> &'static str {
        match self {
            Self::Wage => fields::WAGES,
            Self::Contractor => fields::CONTRACT_RESEARCH,
            Self::Supply => fields::SUPPLIES,
            Self::ComputerLease => fields::COMPUTER_LEASES,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "wage" | "wages" | "employee" | "employees" => Some(Self::Wage),
            "contractor" | "contractors" | "contract_research" => Some(Self::Contractor),
            "supply" | "supplies" => Some(Self::Supply),
            "computer_lease" | "computer_leases" => Some(Self::ComputerLease),
            _ => None,
        }
    }
}

/// One raw expense line prior to aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QreEntry {
    pub category: QreCategory,
    pub name: String,
    pub annual_cost: f64,
    pub applied_percentage: f64,
    pub calculated_qre: f64,
}

impl QreEntry {
    /// Builds an entry whose qualified amount is `annual_cost × applied_percentage / 100`.
    pub fn new(
        category: QreCategory,
        name: impl Into<String>,
        annual_cost: f64,
        applied_percentage: f64,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            annual_cost,
            applied_percentage,
            calculated_qre: annual_cost * applied_percentage / 100.0,
        }
    }

    /// Builds an entry from an already-qualified amount.
    pub fn qualified(category: QreCategory, name: impl Into<String>, amount: f64) -> Self {
        Self {
            category,
            name: name.into(),
            annual_cost: amount,
            applied_percentage: 100.0,
            calculated_qre: amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrossReceiptsRecord {
    pub year: i32,
    pub gross_receipts: f64,
}

/// Snapshot of one business-year's aggregated research inputs.
///
/// Produced once by the aggregator and only ever read afterwards: the line
/// evaluator copies it into a data bag rather than writing to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QreBaseData {
    pub wages: f64,
    pub supplies: f64,
    pub contract_research: f64,
    pub computer_leases: f64,
    pub avg_gross_receipts: f64,
    pub base_period_amount: f64,
    pub basic_research_payments: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, f64>,
}

impl QreBaseData {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Wages, supplies, and contract research; the basis most ceilings use.
    pub fn total_qre(&self) -> f64 {
        self.wages + self.supplies + self.contract_research
    }

    pub fn core_value(&self, key: &str) -> Option<f64> {
        let value = match key {
            fields::WAGES => self.wages,
            fields::SUPPLIES => self.supplies,
            fields::CONTRACT_RESEARCH => self.contract_research,
            fields::COMPUTER_LEASES => self.computer_leases,
            fields::AVG_GROSS_RECEIPTS => self.avg_gross_receipts,
            fields::BASE_PERIOD_AMOUNT => self.base_period_amount,
            fields::BASIC_RESEARCH_PAYMENTS => self.basic_research_payments,
            _ => return None,
        };
        Some(value)
    }

    /// Every seeded field: the core snapshot first, then extensions. An
    /// extension never shadows a core field.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let core = fields::CORE
            .iter()
            .filter_map(move |key| self.core_value(key).map(|value| (*key, value)));
        let extensions = self
            .extensions
            .iter()
            .filter(|(key, _)| !fields::is_core(key))
            .map(|(key, value)| (key.as_str(), *value));
        core.chain(extensions)
    }
}

impl FieldLookup for QreBaseData {
    fn field(&self, key: &str) -> Option<f64> {
        self.core_value(key)
            .or_else(|| self.extensions.get(key).copied())
    }

    fn entity_type(&self) -> Option<EntityType> {
        self.entity_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_accepts_record_spellings() {
        assert_eq!("C-Corp".parse::<EntityType>(), Ok(EntityType::CCorporation));
        assert_eq!("CCORP".parse::<EntityType>(), Ok(EntityType::CCorporation));
        assert_eq!("s_corp".parse::<EntityType>(), Ok(EntityType::SCorporation));
        assert_eq!("LLP".parse::<EntityType>(), Ok(EntityType::Partnership));
        assert_eq!("llc".parse::<EntityType>(), Ok(EntityType::Llc));
        assert_eq!(
            "Sole Proprietorship".parse::<EntityType>(),
            Ok(EntityType::Individual)
        );
        assert_eq!(
            "Trust".parse::<EntityType>(),
            Err(UnknownEntityType("Trust".to_string()))
        );
    }

    #[test]
    fn extensions_never_shadow_core_fields() {
        let base = QreBaseData {
            wages: 10.0,
            ..QreBaseData::zero()
        }
        .with_extension(fields::WAGES, 99.0)
        .with_extension(fields::TAX_LIABILITY, 5.0);

        let seeded: BTreeMap<&str, f64> = base.entries().collect();
        assert_eq!(seeded.get(fields::WAGES), Some(&10.0));
        assert_eq!(seeded.get(fields::TAX_LIABILITY), Some(&5.0));
        assert_eq!(base.field(fields::TAX_LIABILITY), Some(5.0));
        assert_eq!(base.field("unknown"), None);
    }

    #[test]
    fn category_parse_accepts_common_labels() {
        assert_eq!(QreCategory::parse("Employee"), Some(QreCategory::Wage));
        assert_eq!(
            QreCategory::parse("contract research"),
            Some(QreCategory::Contractor)
        );
        assert_eq!(
            QreCategory::parse("computer-leases"),
            Some(QreCategory::ComputerLease)
        );
        assert_eq!(QreCategory::parse("travel"), None);
    }
}
