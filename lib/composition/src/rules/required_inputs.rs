use std::collections::HashSet;

use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::schema::TypeKind;
use crate::selection_map::SchemaView;

pub(super) const RULE: Rule = Rule {
    name: "required_inputs",
    events: &[MemberKind::InputType, MemberKind::FieldArgument],
    check,
};

fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    match event {
        MemberEvent::Type(definition) => {
            let mut diagnostics = Vec::new();
            let mut reported_inaccessible = HashSet::new();

            for source in context.sources_defining(&definition.name) {
                let Some(source_definition) = source
                    .type_definition(&definition.name)
                    .filter(|source_definition| source_definition.kind == TypeKind::InputObject)
                else {
                    continue;
                };

                for source_field in source_definition.input_fields.values() {
                    if !source_field.is_required() {
                        continue;
                    }
                    let coordinate = SchemaCoordinate::member(&definition.name, &source_field.name);
                    match definition.input_fields.get(&source_field.name) {
                        None => diagnostics.push(
                            Diagnostic::error(
                                DiagnosticCode::RequiredInputFieldMissingInSomeSchema,
                                format!(
                                    "the input field \"{}\" is required in \"{}\" but is not defined by every source schema",
                                    coordinate,
                                    source.name()
                                ),
                            )
                            .with_coordinate(coordinate)
                            .with_source_schema(source.name()),
                        ),
                        Some(composed)
                            if !composed.is_accessible()
                                && definition.is_accessible()
                                && reported_inaccessible.insert(source_field.name.clone()) =>
                        {
                            diagnostics.push(
                                Diagnostic::error(
                                    DiagnosticCode::RequiredInputFieldOrArgumentInaccessible,
                                    format!(
                                        "the input field \"{}\" is required but marked @inaccessible",
                                        coordinate
                                    ),
                                )
                                .with_coordinate(coordinate),
                            )
                        }
                        Some(_) => {}
                    }
                }
            }

            diagnostics
        }
        MemberEvent::FieldArgument {
            parent,
            field,
            argument,
        } => {
            if !parent.is_accessible()
                || !field.is_accessible()
                || argument.is_accessible()
                || !argument.is_required()
            {
                return Vec::new();
            }
            let coordinate = SchemaCoordinate::argument(&parent.name, &field.name, &argument.name);
            vec![Diagnostic::error(
                DiagnosticCode::RequiredInputFieldOrArgumentInaccessible,
                format!("the argument \"{}\" is required but marked @inaccessible", coordinate),
            )
            .with_coordinate(coordinate)]
        }
        _ => Vec::new(),
    }
}
