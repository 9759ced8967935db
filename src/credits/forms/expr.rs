//! Calculation expressions stored as data.
//!
//! A line's calculation is a small tree interpreted against whatever
//! [`FieldLookup`] the caller supplies (the evaluator's data bag, or base data
//! for availability predicates and rule conditions). Fields that are absent
//! read as zero, so a form never fails just because an optional input was
//! left blank.

use serde::{Deserialize, Serialize};

use crate::credits::domain::EntityType;

/// Read access to numeric fields and the filer's entity type.
pub trait FieldLookup {
    fn field(&self, key: &str) -> Option<f64>;
    fn entity_type(&self) -> Option<EntityType>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("calculation produced a non-finite value")]
    NonFinite,
    #[error("min/max over an empty list")]
    EmptyAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Const(f64),
    Field(String),
    Sum(Vec<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Min(Vec<Expr>),
    Max(Vec<Expr>),
    If {
        when: Box<Condition>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    EntityRate(EntityRateTable),
}

/// Rate keyed by the filer's entity type, e.g. IRC §280C(c) reduced-credit
/// percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRateTable {
    pub rates: Vec<EntityRate>,
    pub default: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityRate {
    pub entity: EntityType,
    pub rate: f64,
}

impl EntityRateTable {
    pub fn rate_for(&self, entity: Option<EntityType>) -> f64 {
        entity
            .and_then(|entity| {
                self.rates
                    .iter()
                    .find(|candidate| candidate.entity == entity)
                    .map(|candidate| candidate.rate)
            })
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Lt(Expr, Expr),
    Lte(Expr, Expr),
    Gt(Expr, Expr),
    Gte(Expr, Expr),
    /// True when the entity type is on record and listed.
    EntityIn(Vec<EntityType>),
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

pub fn field(key: impl Into<String>) -> Expr {
    Expr::Field(key.into())
}

pub fn constant(value: f64) -> Expr {
    Expr::Const(value)
}

pub fn sum<I>(terms: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    Expr::Sum(terms.into_iter().collect())
}

/// `min(a, b)`, the "enter the lesser of" instruction.
pub fn lesser(a: Expr, b: Expr) -> Expr {
    Expr::Min(vec![a, b])
}

pub fn greater(a: Expr, b: Expr) -> Expr {
    Expr::Max(vec![a, b])
}

pub fn when(condition: Condition, then: Expr, otherwise: Expr) -> Expr {
    Expr::If {
        when: Box::new(condition),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    }
}

pub fn entity_rate<I>(rates: I, default: f64) -> Expr
where
    I: IntoIterator<Item = (EntityType, f64)>,
{
    Expr::EntityRate(EntityRateTable {
        rates: rates
            .into_iter()
            .map(|(entity, rate)| EntityRate { entity, rate })
            .collect(),
        default,
    })
}

impl Expr {
    pub fn plus(self, other: Expr) -> Expr {
        Expr::Sum(vec![self, other])
    }

    pub fn minus(self, other: Expr) -> Expr {
        Expr::Sub(Box::new(self), Box::new(other))
    }

    pub fn times(self, other: Expr) -> Expr {
        Expr::Mul(Box::new(self), Box::new(other))
    }

    pub fn rate(self, rate: f64) -> Expr {
        self.times(constant(rate))
    }

    pub fn divided_by(self, other: Expr) -> Expr {
        Expr::Div(Box::new(self), Box::new(other))
    }

    /// `self × percent / 100`, for percentage lines entered as whole numbers.
    pub fn percent(self, percent: Expr) -> Expr {
        self.times(percent).divided_by(constant(100.0))
    }

    /// "If less than zero, enter zero."
    pub fn floor_zero(self) -> Expr {
        greater(self, constant(0.0))
    }

    pub fn capped_at(self, cap: f64) -> Expr {
        lesser(self, constant(cap))
    }

    pub fn lt(self, other: Expr) -> Condition {
        Condition::Lt(self, other)
    }

    pub fn lte(self, other: Expr) -> Condition {
        Condition::Lte(self, other)
    }

    pub fn gt(self, other: Expr) -> Condition {
        Condition::Gt(self, other)
    }

    pub fn gte(self, other: Expr) -> Condition {
        Condition::Gte(self, other)
    }

    pub fn evaluate<L>(&self, lookup: &L) -> Result<f64, ExprError>
    where
        L: FieldLookup + ?Sized,
    {
        let value = match self {
            Expr::Const(value) => *value,
            Expr::Field(key) => lookup.field(key).unwrap_or(0.0),
            Expr::Sum(terms) => {
                let mut total = 0.0;
                for term in terms {
                    total += term.evaluate(lookup)?;
                }
                total
            }
            Expr::Sub(lhs, rhs) => lhs.evaluate(lookup)? - rhs.evaluate(lookup)?,
            Expr::Mul(lhs, rhs) => lhs.evaluate(lookup)? * rhs.evaluate(lookup)?,
            Expr::Div(lhs, rhs) => {
                let numerator = lhs.evaluate(lookup)?;
                let denominator = rhs.evaluate(lookup)?;
                if denominator == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                numerator / denominator
            }
            Expr::Min(terms) => fold_extreme(terms, lookup, f64::min)?,
            Expr::Max(terms) => fold_extreme(terms, lookup, f64::max)?,
            Expr::If {
                when,
                then,
                otherwise,
            } => {
                if when.evaluate(lookup)? {
                    then.evaluate(lookup)?
                } else {
                    otherwise.evaluate(lookup)?
                }
            }
            Expr::EntityRate(table) => table.rate_for(lookup.entity_type()),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExprError::NonFinite)
        }
    }

    /// Every field key the expression reads, in first-seen order.
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a str>) {
        match self {
            Expr::Const(_) | Expr::EntityRate(_) => {}
            Expr::Field(key) => {
                if !refs.contains(&key.as_str()) {
                    refs.push(key.as_str());
                }
            }
            Expr::Sum(terms) | Expr::Min(terms) | Expr::Max(terms) => {
                for term in terms {
                    term.collect_references(refs);
                }
            }
            Expr::Sub(lhs, rhs) | Expr::Mul(lhs, rhs) | Expr::Div(lhs, rhs) => {
                lhs.collect_references(refs);
                rhs.collect_references(refs);
            }
            Expr::If {
                when,
                then,
                otherwise,
            } => {
                when.collect_references(refs);
                then.collect_references(refs);
                otherwise.collect_references(refs);
            }
        }
    }
}

fn fold_extreme<L>(terms: &[Expr], lookup: &L, pick: fn(f64, f64) -> f64) -> Result<f64, ExprError>
where
    L: FieldLookup + ?Sized,
{
    let mut iter = terms.iter();
    let first = iter.next().ok_or(ExprError::EmptyAggregate)?;
    let mut acc = first.evaluate(lookup)?;
    for term in iter {
        acc = pick(acc, term.evaluate(lookup)?);
    }
    Ok(acc)
}

impl Condition {
    pub fn entity_in<I>(entities: I) -> Condition
    where
        I: IntoIterator<Item = EntityType>,
    {
        Condition::EntityIn(entities.into_iter().collect())
    }

    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    pub fn evaluate<L>(&self, lookup: &L) -> Result<bool, ExprError>
    where
        L: FieldLookup + ?Sized,
    {
        Ok(match self {
            Condition::Lt(lhs, rhs) => lhs.evaluate(lookup)? < rhs.evaluate(lookup)?,
            Condition::Lte(lhs, rhs) => lhs.evaluate(lookup)? <= rhs.evaluate(lookup)?,
            Condition::Gt(lhs, rhs) => lhs.evaluate(lookup)? > rhs.evaluate(lookup)?,
            Condition::Gte(lhs, rhs) => lhs.evaluate(lookup)? >= rhs.evaluate(lookup)?,
            Condition::EntityIn(entities) => lookup
                .entity_type()
                .map(|entity| entities.contains(&entity))
                .unwrap_or(false),
            Condition::Not(inner) => !inner.evaluate(lookup)?,
            Condition::All(conditions) => {
                for condition in conditions {
                    if !condition.evaluate(lookup)? {
                        return Ok(false);
                    }
                }
                true
            }
            Condition::Any(conditions) => {
                for condition in conditions {
                    if condition.evaluate(lookup)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }

    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a str>) {
        match self {
            Condition::Lt(lhs, rhs)
            | Condition::Lte(lhs, rhs)
            | Condition::Gt(lhs, rhs)
            | Condition::Gte(lhs, rhs) => {
                lhs.collect_references(refs);
                rhs.collect_references(refs);
            }
            Condition::EntityIn(_) => {}
            Condition::Not(inner) => inner.collect_references(refs),
            Condition::All(conditions) | Condition::Any(conditions) => {
                for condition in conditions {
                    condition.collect_references(refs);
                }
            }
        }
    }
}
