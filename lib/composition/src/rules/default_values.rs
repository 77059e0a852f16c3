use graphql_parser::query::Value;

use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::schema::{ConstValue, TypeKind};
use crate::selection_map::SchemaView;
use crate::type_ref::TypeRef;

pub(super) const RULE: Rule = Rule {
    name: "default_value_uses_inaccessible",
    events: &[MemberKind::FieldArgument, MemberKind::InputField],
    check,
};

fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let (value_definition, coordinate, accessible) = match event {
        MemberEvent::FieldArgument {
            parent,
            field,
            argument,
        } => (
            *argument,
            SchemaCoordinate::argument(&parent.name, &field.name, &argument.name),
            parent.is_accessible() && field.is_accessible() && argument.is_accessible(),
        ),
        MemberEvent::InputField { parent, field } => (
            *field,
            SchemaCoordinate::member(&parent.name, &field.name),
            parent.is_accessible() && field.is_accessible(),
        ),
        _ => return Vec::new(),
    };

    let Some(default_value) = &value_definition.default_value else {
        return Vec::new();
    };
    if !accessible {
        return Vec::new();
    }

    let mut diagnostics = Vec::new();
    check_value(
        default_value,
        &value_definition.ty,
        context,
        &coordinate,
        &mut diagnostics,
    );
    diagnostics
}

fn check_value(
    value: &ConstValue,
    ty: &TypeRef,
    context: &RuleContext<'_>,
    coordinate: &SchemaCoordinate,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let named_type = context.schema.type_definition(ty.named_type());

    match value {
        Value::List(items) => {
            let item_type = ty.list_item().unwrap_or(ty);
            for item in items {
                check_value(item, item_type, context, coordinate, diagnostics);
            }
        }
        Value::Enum(name) => {
            let Some(definition) = named_type.filter(|definition| definition.kind == TypeKind::Enum)
            else {
                return;
            };
            if definition
                .enum_values
                .get(name)
                .is_some_and(|enum_value| !enum_value.is_accessible())
            {
                let value_coordinate = SchemaCoordinate::member(&definition.name, name);
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::DefaultValueUsesInaccessible,
                        format!(
                            "the default value of \"{}\" uses the inaccessible enum value \"{}\"",
                            coordinate, value_coordinate
                        ),
                    )
                    .with_coordinate(coordinate.clone())
                    .with_coordinate(value_coordinate),
                );
            }
        }
        Value::Object(fields) => {
            let Some(definition) =
                named_type.filter(|definition| definition.kind == TypeKind::InputObject)
            else {
                return;
            };
            for (name, field_value) in fields {
                let Some(input_field) = definition.input_fields.get(name) else {
                    continue;
                };
                if input_field.is_accessible() {
                    check_value(field_value, &input_field.ty, context, coordinate, diagnostics);
                    continue;
                }
                let field_coordinate = SchemaCoordinate::member(&definition.name, name);
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::DefaultValueUsesInaccessible,
                        format!(
                            "the default value of \"{}\" uses the inaccessible input field \"{}\"",
                            coordinate, field_coordinate
                        ),
                    )
                    .with_coordinate(coordinate.clone())
                    .with_coordinate(field_coordinate),
                );
            }
        }
        _ => {}
    }
}
