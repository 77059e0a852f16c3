use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::directives::KeyField;
use crate::selection_map::SchemaView;
use crate::source_schema::SourceSchema;

pub(super) const RULE: Rule = Rule {
    name: "key_fields",
    events: &[MemberKind::ObjectType, MemberKind::InterfaceType],
    check,
};

/// Keys are checked against the source schema declaring them: a source schema can only
/// resolve an entity by fields it defines itself.
fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let MemberEvent::Type(definition) = event else {
        return Vec::new();
    };

    let mut diagnostics = Vec::new();
    for source in context.sources_defining(&definition.name) {
        let Some(source_definition) = source.type_definition(&definition.name) else {
            continue;
        };
        for key in &source_definition.directives.keys {
            match &key.selection {
                Err(err) => diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::KeyInvalidSyntax,
                        format!(
                            "the key \"{}\" on \"{}\" cannot be parsed: {}",
                            key.fields, definition.name, err
                        ),
                    )
                    .with_coordinate(SchemaCoordinate::ty(&definition.name))
                    .with_source_schema(source.name()),
                ),
                Ok(fields) => {
                    let mut problems = Vec::new();
                    check_key_fields(source, &definition.name, fields, &mut problems);
                    for (coordinate, problem) in problems {
                        diagnostics.push(
                            Diagnostic::error(
                                DiagnosticCode::KeyInvalidFields,
                                format!(
                                    "the key \"{}\" on \"{}\" is invalid: {}",
                                    key.fields, definition.name, problem
                                ),
                            )
                            .with_coordinate(SchemaCoordinate::ty(&definition.name))
                            .with_coordinate(coordinate)
                            .with_source_schema(source.name()),
                        );
                    }
                }
            }
        }
    }

    diagnostics
}

fn check_key_fields(
    source: &SourceSchema,
    type_name: &str,
    fields: &[KeyField],
    problems: &mut Vec<(SchemaCoordinate, String)>,
) {
    for key_field in fields {
        let coordinate = SchemaCoordinate::member(type_name, &key_field.name);
        let Some(field) = source.field(type_name, &key_field.name) else {
            problems.push((coordinate.clone(), format!("\"{}\" does not exist", coordinate)));
            continue;
        };
        if !field.arguments.is_empty() {
            problems.push((
                coordinate.clone(),
                format!("\"{}\" takes arguments", coordinate),
            ));
        }

        let field_type = field.ty.named_type();
        let is_leaf = source.is_leaf_type(field_type);
        match (is_leaf, key_field.children.is_empty()) {
            (true, false) => problems.push((
                coordinate.clone(),
                format!("\"{}\" is a leaf and cannot have a nested selection", coordinate),
            )),
            (false, true) => problems.push((
                coordinate.clone(),
                format!("\"{}\" is composite and requires a nested selection", coordinate),
            )),
            (false, false) => check_key_fields(source, field_type, &key_field.children, problems),
            (true, true) => {}
        }
    }
}
