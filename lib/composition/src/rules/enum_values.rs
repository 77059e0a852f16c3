use std::collections::HashSet;

use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::schema::TypeKind;
use crate::selection_map::SchemaView;

pub(super) const RULE: Rule = Rule {
    name: "enum_values_mismatch",
    events: &[MemberKind::EnumType],
    check,
};

/// Enums used as inputs must be defined identically everywhere, otherwise a client could
/// send a value some source schema rejects.
fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let MemberEvent::Type(definition) = event else {
        return Vec::new();
    };
    if !is_input_type(&definition.name, context) {
        return Vec::new();
    }

    let mut diagnostics = Vec::new();
    for source in context.sources_defining(&definition.name) {
        let Some(source_definition) = source
            .type_definition(&definition.name)
            .filter(|source_definition| source_definition.kind == TypeKind::Enum)
        else {
            continue;
        };
        for value in definition.enum_values.values() {
            if !value.is_accessible() || source_definition.enum_values.contains_key(&value.name) {
                continue;
            }
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::EnumValuesMismatch,
                    format!(
                        "the enum \"{}\" is used as an input but \"{}\" does not define the value \"{}\"",
                        definition.name,
                        source.name(),
                        value.name
                    ),
                )
                .with_coordinate(SchemaCoordinate::member(&definition.name, &value.name))
                .with_source_schema(source.name()),
            );
        }
    }

    diagnostics
}

fn is_input_type(name: &str, context: &RuleContext<'_>) -> bool {
    let mut input_types = HashSet::new();
    for definition in context.schema.types() {
        for field in definition.fields.values() {
            for argument in field.arguments.values() {
                input_types.insert(argument.ty.named_type());
            }
        }
        for field in definition.input_fields.values() {
            input_types.insert(field.ty.named_type());
        }
    }
    input_types.contains(name)
}
