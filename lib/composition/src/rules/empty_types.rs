use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::schema::{TypeDefinition, TypeKind};
use crate::selection_map::SchemaView;

pub(super) const RULE: Rule = Rule {
    name: "empty_merged_type",
    events: &[
        MemberKind::ObjectType,
        MemberKind::InterfaceType,
        MemberKind::UnionType,
        MemberKind::EnumType,
        MemberKind::InputType,
    ],
    check,
};

fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let MemberEvent::Type(definition) = event else {
        return Vec::new();
    };
    if !definition.is_accessible() {
        return Vec::new();
    }

    let (has_members, code, members) = match definition.kind {
        TypeKind::Object | TypeKind::Interface => (
            definition.fields.values().any(|field| field.is_accessible()),
            if definition.kind == TypeKind::Object {
                DiagnosticCode::EmptyMergedObjectType
            } else {
                DiagnosticCode::EmptyMergedInterfaceType
            },
            "fields",
        ),
        TypeKind::Union => (
            definition.union_members.iter().any(|member| {
                context
                    .schema
                    .type_definition(member)
                    .is_some_and(TypeDefinition::is_accessible)
            }),
            DiagnosticCode::EmptyMergedUnionType,
            "member types",
        ),
        TypeKind::Enum => (
            definition.enum_values.values().any(|value| value.is_accessible()),
            DiagnosticCode::EmptyMergedEnumType,
            "values",
        ),
        TypeKind::InputObject => (
            definition.input_fields.values().any(|field| field.is_accessible()),
            DiagnosticCode::EmptyMergedInputObjectType,
            "fields",
        ),
        TypeKind::Scalar => return Vec::new(),
    };

    if has_members {
        return Vec::new();
    }

    vec![Diagnostic::error(
        code,
        format!(
            "the {} type \"{}\" has no accessible {} after merging",
            definition.kind, definition.name, members
        ),
    )
    .with_coordinate(SchemaCoordinate::ty(&definition.name))]
}
