//! Composition of GraphQL source schemas into one composed schema.
//!
//! Composition never stops at the first problem: every merge conflict and rule violation is
//! collected as a [`Diagnostic`] and the caller decides whether the schema can be activated,
//! usually through [`CompositionResult::into_schema`].

use tracing::{debug, instrument};

pub mod composed_schema;
pub mod coordinate;
pub mod diagnostics;
pub mod directives;
pub mod merge;
mod render;
pub mod rules;
pub mod schema;
pub mod selection_map;
pub mod source_schema;
pub mod type_ref;

#[cfg(test)]
mod tests;

pub use composed_schema::ComposedSchema;
pub use coordinate::SchemaCoordinate;
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use source_schema::{RootOperationKind, SourceSchema, SourceSchemaError};
pub use type_ref::TypeRef;

use crate::merge::merge_source_schemas;
use crate::rules::{RuleContext, RuleDispatcher};

/// The composed schema together with everything composition found wrong with it.
#[derive(Debug, Clone)]
pub struct CompositionResult {
    schema: ComposedSchema,
    diagnostics: Diagnostics,
}

impl CompositionResult {
    pub fn schema(&self) -> &ComposedSchema {
        &self.schema
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Fails closed: any error-severity diagnostic withholds the schema.
    pub fn into_schema(self) -> Result<ComposedSchema, Diagnostics> {
        if self.diagnostics.has_errors() {
            return Err(self.diagnostics);
        }
        Ok(self.schema)
    }
}

/// Merges `sources` in order and runs the post-merge rules over the result.
#[instrument(level = "trace", skip_all, fields(source_schemas = sources.len()))]
pub fn compose(sources: &[SourceSchema]) -> CompositionResult {
    let mut diagnostics = Diagnostics::default();

    for source in sources {
        for issue in source.directive_issues() {
            diagnostics.push(
                Diagnostic::error(DiagnosticCode::InvalidDirective, issue.error.to_string())
                    .with_coordinate(issue.coordinate.clone())
                    .with_source_schema(source.name()),
            );
        }
    }

    let schema = merge_source_schemas(sources, &mut diagnostics);

    let context = RuleContext {
        schema: &schema,
        sources,
    };
    RuleDispatcher::default().run(&context, &mut diagnostics);

    debug!(
        types = schema.types().count(),
        errors = diagnostics.iter_errors().count(),
        warnings = diagnostics.iter_warnings().count(),
        "composition finished"
    );

    CompositionResult {
        schema,
        diagnostics,
    }
}
