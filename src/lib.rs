//! Jurisdiction R&D tax-credit pro forma engine.
//!
//! Aggregates qualified research expenses into a base-data snapshot,
//! evaluates each jurisdiction's line-item forms against it, applies the
//! jurisdiction's validation rules, and picks the better calculation method.

pub mod config;
pub mod credits;
pub mod error;
pub mod telemetry;

pub use config::EngineConfig;
pub use credits::{
    BestCreditSelector, CreditSelection, JurisdictionRegistry, LineEvaluator, MethodComparator,
    QreAggregator, QreBaseData, ValidationEngine,
};
pub use error::EngineError;
