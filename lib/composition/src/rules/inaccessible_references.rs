use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::selection_map::SchemaView;

pub(super) const RULE: Rule = Rule {
    name: "reference_to_inaccessible_type",
    events: &[
        MemberKind::OutputField,
        MemberKind::FieldArgument,
        MemberKind::InputField,
    ],
    check,
};

fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let (ty, coordinate, accessible) = match event {
        MemberEvent::OutputField { parent, field } => (
            &field.ty,
            SchemaCoordinate::member(&parent.name, &field.name),
            parent.is_accessible() && field.is_accessible(),
        ),
        MemberEvent::FieldArgument {
            parent,
            field,
            argument,
        } => (
            &argument.ty,
            SchemaCoordinate::argument(&parent.name, &field.name, &argument.name),
            parent.is_accessible() && field.is_accessible() && argument.is_accessible(),
        ),
        MemberEvent::InputField { parent, field } => (
            &field.ty,
            SchemaCoordinate::member(&parent.name, &field.name),
            parent.is_accessible() && field.is_accessible(),
        ),
        _ => return Vec::new(),
    };

    if !accessible {
        return Vec::new();
    }

    match context.schema.type_definition(ty.named_type()) {
        Some(referenced) if !referenced.is_accessible() => vec![Diagnostic::error(
            DiagnosticCode::ReferenceToInaccessibleType,
            format!(
                "\"{}\" is accessible but references the inaccessible type \"{}\"",
                coordinate, referenced.name
            ),
        )
        .with_coordinate(coordinate)
        .with_coordinate(SchemaCoordinate::ty(&referenced.name))],
        _ => Vec::new(),
    }
}
