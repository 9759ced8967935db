//! Jurisdiction R&D credit engine.
//!
//! Data flows one way: the aggregator produces [`QreBaseData`], the registry
//! supplies [`JurisdictionConfig`]s, the evaluator fills a form, validation and
//! comparison read the evaluated values, and the selector totals the best
//! credit per jurisdiction. Every stage is a pure function of its inputs.

pub mod aggregation;
pub mod comparison;
pub mod domain;
pub mod evaluation;
pub mod forms;
pub mod registry;
pub mod selection;
pub mod validation;

#[cfg(test)]
mod tests;

pub use aggregation::{EntryImportError, QreAggregator};
pub use comparison::{
    ComparisonResult, DetailedComparison, MethodComparator, MethodOverrides, Recommendation,
};
pub use domain::{
    fields, EntityType, GrossReceiptsRecord, Method, QreBaseData, QreCategory, QreEntry,
    UnknownEntityType,
};
pub use evaluation::{
    DiagnosticKind, EvaluationResult, LineDiagnostic, LineEvaluator, Overrides, TerminalCredit,
};
pub use forms::{
    ConfigError, DataType, Expr, FieldLookup, FormDefinition, LineConstraints, LineDefinition,
};
pub use registry::{
    CreditMetadata, CreditType, JurisdictionConfig, JurisdictionRegistry, RegistryError,
};
pub use selection::{BestCreditSelector, CreditSelection, JurisdictionCredit, JurisdictionFailure};
pub use validation::{ValidationEngine, ValidationResult, ValidationRule};
