use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::selection_map::validate_selection_map;

pub(super) const RULE: Rule = Rule {
    name: "requires_fields",
    events: &[MemberKind::OutputField],
    check,
};

/// Required fields travel in the same sub-query as the requiring field, so the map must
/// resolve against the source schema that resolves that field. A source schema missing from
/// the composition is reported elsewhere; its maps are resolved against the composed schema.
fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let MemberEvent::OutputField { parent, field } = event else {
        return Vec::new();
    };
    let coordinate = SchemaCoordinate::member(&parent.name, &field.name);

    let mut diagnostics = Vec::new();
    for source in &field.sources {
        let Some(requires) = &source.requires else {
            continue;
        };
        match &requires.field.parsed {
            Err(err) => diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::RequireInvalidSyntax,
                    format!(
                        "the @requires map \"{}\" on \"{}\" cannot be parsed: {}",
                        requires.field.source, coordinate, err
                    ),
                )
                .with_coordinate(coordinate.clone())
                .with_source_schema(&source.schema),
            ),
            Ok(map) => {
                let validation = match context.source_schema(&source.schema) {
                    Some(owner) => validate_selection_map(map, None, &parent.name, owner),
                    None => validate_selection_map(map, None, &parent.name, context.schema),
                };
                for error in validation.errors {
                    let mut diagnostic = Diagnostic::error(
                        DiagnosticCode::RequireInvalidFields,
                        format!(
                            "the @requires map \"{}\" on \"{}\" is invalid: {}",
                            requires.field.source, coordinate, error
                        ),
                    )
                    .with_coordinate(coordinate.clone());
                    if let Some(referenced) = error.coordinate() {
                        diagnostic = diagnostic.with_coordinate(referenced.clone());
                    }
                    diagnostics.push(diagnostic.with_source_schema(&source.schema));
                }
            }
        }
    }

    diagnostics
}
