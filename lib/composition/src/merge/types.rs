use super::directives::{merge_description, merge_member_directives};
use super::field::{merge_enum_value, merge_field, merge_input_value};
use super::MergeEnv;
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::DiagnosticCode;
use crate::schema::{TypeDefinition, TypeKind};

/// Folds one source schema's contribution into a composed type of the same kind.
pub(super) fn merge_type(target: &mut TypeDefinition, source: &TypeDefinition, env: &mut MergeEnv<'_>) {
    let type_name = target.name.clone();

    merge_description(&mut target.description, &source.description);
    merge_member_directives(&mut target.directives, &source.directives, &env.repeatable);

    match target.kind {
        TypeKind::Scalar => {}
        TypeKind::Object | TypeKind::Interface => {
            for interface in &source.interfaces {
                if !target.interfaces.contains(interface) {
                    target.interfaces.push(interface.clone());
                }
            }
            for field in source.fields.values() {
                match target.fields.get_mut(&field.name) {
                    Some(existing) => merge_field(existing, field, &type_name, env),
                    None => {
                        target.fields.insert(field.name.clone(), field.clone());
                    }
                }
            }
        }
        TypeKind::Union => {
            for member in &source.union_members {
                if !target.union_members.contains(member) {
                    target.union_members.push(member.clone());
                }
            }
        }
        TypeKind::Enum => {
            for value in source.enum_values.values() {
                match target.enum_values.get_mut(&value.name) {
                    Some(existing) => merge_enum_value(existing, value, env),
                    None => {
                        target.enum_values.insert(value.name.clone(), value.clone());
                    }
                }
            }
        }
        TypeKind::InputObject => {
            for field in source.input_fields.values() {
                match target.input_fields.get_mut(&field.name) {
                    Some(existing) => merge_input_value(
                        existing,
                        field,
                        SchemaCoordinate::member(&type_name, &field.name),
                        DiagnosticCode::InputFieldTypesNotMergeable,
                        env,
                    ),
                    None => {
                        target.input_fields.insert(field.name.clone(), field.clone());
                    }
                }
            }
        }
    }
}
