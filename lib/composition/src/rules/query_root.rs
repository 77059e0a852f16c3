use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::selection_map::SchemaView;

pub(super) const RULE: Rule = Rule {
    name: "query_root",
    events: &[MemberKind::Schema],
    check,
};

fn check(_event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for source in context.sources {
        if source
            .type_definition("Query")
            .is_some_and(|query| !query.is_accessible())
        {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::QueryRootTypeInaccessible,
                    "the query root type must not be marked @inaccessible",
                )
                .with_coordinate(SchemaCoordinate::ty("Query"))
                .with_source_schema(source.name()),
            );
        }
    }

    let has_queries = context.schema.query_type().is_some_and(|query| {
        query.is_accessible() && query.fields.values().any(|field| field.is_accessible())
    });
    if !has_queries {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::NoQueries,
                "the composed schema does not expose any query field",
            )
            .with_coordinate(SchemaCoordinate::ty("Query")),
        );
    }

    diagnostics
}
