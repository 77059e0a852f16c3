use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};

pub(super) const RULE: Rule = Rule {
    name: "source_schema_exists",
    events: &[MemberKind::OutputField],
    check,
};

fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let MemberEvent::OutputField { parent, field } = event else {
        return Vec::new();
    };

    field
        .sources
        .iter()
        .filter(|source| !context.schema.has_source_schema(&source.schema))
        .map(|source| {
            Diagnostic::warning(
                DiagnosticCode::SourceSchemaNotFound,
                format!(
                    "\"{}.{}\" is resolved by the unknown source schema \"{}\"",
                    parent.name, field.name, source.schema
                ),
            )
            .with_coordinate(SchemaCoordinate::member(&parent.name, &field.name))
        })
        .collect()
}
