//! Planning of client operations against a composed schema.
//!
//! A client operation is split into self-contained sub-queries, one per source schema it
//! touches. Every sub-query re-traverses the root fields it shares with the others, so the
//! partial results line up by response path and can be merged without entity lookups.

pub mod error;
pub mod extraction;
pub mod operation;
pub mod planner;
pub mod utils;

#[cfg(test)]
mod tests;

pub use error::ExtractionError;
pub use extraction::dependencies::{FieldDependency, InjectedDependency};
pub use extraction::ExtractedField;
pub use operation::{ClientOperation, OperationKind};
pub use planner::{plan, plan_operation, EntityKeyHint, OperationPlan, SubQuery};
