use std::collections::BTreeSet;

use super::directives::{merge_deprecation, merge_description, merge_member_directives};
use super::type_merger::{merge_input_type, merge_output_type};
use super::MergeEnv;
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::schema::{EnumValueDefinition, FieldDefinition, FieldSource, InputValueDefinition};

pub(super) fn merge_field(
    target: &mut FieldDefinition,
    source: &FieldDefinition,
    type_name: &str,
    env: &mut MergeEnv<'_>,
) {
    let coordinate = SchemaCoordinate::member(type_name, &target.name);

    match merge_output_type(&source.ty, &target.ty) {
        Some(ty) => target.ty = ty,
        None => env.report(
            Diagnostic::error(
                DiagnosticCode::OutputFieldTypesNotMergeable,
                format!(
                    "the field \"{}\" is of type \"{}\" in \"{}\", which cannot be merged with \"{}\"",
                    coordinate, source.ty, env.source_schema, target.ty
                ),
            )
            .with_coordinate(coordinate.clone()),
        ),
    }

    let target_arguments: BTreeSet<&str> = target.arguments.keys().map(String::as_str).collect();
    let source_arguments: BTreeSet<&str> = source.arguments.keys().map(String::as_str).collect();
    if target_arguments != source_arguments {
        let message = format!(
            "the field \"{}\" has arguments ({}) in \"{}\" but ({}) elsewhere",
            coordinate,
            source_arguments.into_iter().collect::<Vec<_>>().join(", "),
            env.source_schema,
            target_arguments.into_iter().collect::<Vec<_>>().join(", "),
        );
        env.report(
            Diagnostic::error(DiagnosticCode::FieldArgumentSetsMismatch, message)
                .with_coordinate(coordinate.clone()),
        );
    } else {
        for argument in source.arguments.values() {
            if let Some(existing) = target.arguments.get_mut(&argument.name) {
                merge_input_value(
                    existing,
                    argument,
                    SchemaCoordinate::argument(type_name, &source.name, &argument.name),
                    DiagnosticCode::ArgumentTypesNotMergeable,
                    env,
                );
            }
        }
    }

    merge_description(&mut target.description, &source.description);
    merge_deprecation(&mut target.deprecation, &source.deprecation);
    merge_member_directives(&mut target.directives, &source.directives, &env.repeatable);
    merge_field_sources(&mut target.sources, &source.sources, &coordinate, env);
}

fn merge_field_sources(
    target: &mut Vec<FieldSource>,
    source: &[FieldSource],
    coordinate: &SchemaCoordinate,
    env: &mut MergeEnv<'_>,
) {
    for field_source in source {
        match target
            .iter_mut()
            .find(|existing| existing.schema == field_source.schema)
        {
            Some(existing) if existing.original_name != field_source.original_name => {
                env.report(
                    Diagnostic::error(
                        DiagnosticCode::SourceNameConflict,
                        format!(
                            "the field \"{}\" is mapped to both \"{}\" and \"{}\" in source schema \"{}\"",
                            coordinate,
                            existing.original_name,
                            field_source.original_name,
                            field_source.schema
                        ),
                    )
                    .with_coordinate(coordinate.clone()),
                );
            }
            Some(existing) => {
                if existing.requires.is_none() {
                    existing.requires = field_source.requires.clone();
                }
            }
            None => target.push(field_source.clone()),
        }
    }
}

pub(super) fn merge_input_value(
    target: &mut InputValueDefinition,
    source: &InputValueDefinition,
    coordinate: SchemaCoordinate,
    code: DiagnosticCode,
    env: &mut MergeEnv<'_>,
) {
    match merge_input_type(&source.ty, &target.ty) {
        Some(ty) => target.ty = ty,
        None => env.report(
            Diagnostic::error(
                code,
                format!(
                    "\"{}\" is of type \"{}\" in \"{}\", which cannot be merged with \"{}\"",
                    coordinate, source.ty, env.source_schema, target.ty
                ),
            )
            .with_coordinate(coordinate),
        ),
    }

    let target_has_default = target
        .default_value
        .as_ref()
        .is_some_and(|value| !matches!(value, graphql_parser::query::Value::Null));
    if !target_has_default && source.default_value.is_some() {
        target.default_value = source.default_value.clone();
    }

    merge_description(&mut target.description, &source.description);
    merge_deprecation(&mut target.deprecation, &source.deprecation);
    merge_member_directives(&mut target.directives, &source.directives, &env.repeatable);
}

pub(super) fn merge_enum_value(
    target: &mut EnumValueDefinition,
    source: &EnumValueDefinition,
    env: &MergeEnv<'_>,
) {
    merge_description(&mut target.description, &source.description);
    merge_deprecation(&mut target.deprecation, &source.deprecation);
    merge_member_directives(&mut target.directives, &source.directives, &env.repeatable);
}
