use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::selection_map::validate_selection_map;

pub(super) const RULE: Rule = Rule {
    name: "is_argument",
    events: &[MemberKind::FieldArgument],
    check,
};

/// `@is` ties a lookup argument to a value of the field's return type. Exactly one of
/// `field` and `coordinate` must be given.
fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let MemberEvent::FieldArgument {
        parent,
        field,
        argument,
    } = event
    else {
        return Vec::new();
    };
    let Some(is) = &argument.directives.is else {
        return Vec::new();
    };

    let coordinate = SchemaCoordinate::argument(&parent.name, &field.name, &argument.name);
    let return_type = field.ty.named_type();
    let error = |code: DiagnosticCode, message: String| {
        Diagnostic::error(code, message).with_coordinate(coordinate.clone())
    };

    match (&is.field, &is.coordinate) {
        (Some(_), Some(_)) | (None, None) => vec![error(
            DiagnosticCode::IsInvalidUsage,
            format!(
                "@is on \"{}\" must specify exactly one of \"field\" and \"coordinate\"",
                coordinate
            ),
        )],
        (Some(map), None) => match &map.parsed {
            Err(err) => vec![error(
                DiagnosticCode::IsInvalidSyntax,
                format!(
                    "the @is map \"{}\" on \"{}\" cannot be parsed: {}",
                    map.source, coordinate, err
                ),
            )],
            Ok(parsed) => validate_selection_map(parsed, Some(&argument.ty), return_type, context.schema)
                .errors
                .into_iter()
                .map(|validation_error| {
                    error(
                        DiagnosticCode::IsInvalidFields,
                        format!(
                            "the @is map \"{}\" on \"{}\" is invalid: {}",
                            map.source, coordinate, validation_error
                        ),
                    )
                })
                .collect(),
        },
        (None, Some(Err(err))) => vec![error(
            DiagnosticCode::IsInvalidSyntax,
            format!("the @is coordinate on \"{}\" cannot be parsed: {}", coordinate, err),
        )],
        (None, Some(Ok(target))) => {
            let resolves = match target {
                SchemaCoordinate::Member(type_name, member) if type_name == return_type => context
                    .schema
                    .field(type_name, member)
                    .is_some_and(|target_field| {
                        target_field.ty.named_type() == argument.ty.named_type()
                    }),
                _ => false,
            };
            if resolves {
                Vec::new()
            } else {
                vec![error(
                    DiagnosticCode::IsInvalidFields,
                    format!(
                        "the @is coordinate \"{}\" on \"{}\" does not name a field of \"{}\" of type \"{}\"",
                        target,
                        coordinate,
                        return_type,
                        argument.ty.named_type()
                    ),
                )]
            }
        }
    }
}
