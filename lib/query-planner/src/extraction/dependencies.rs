//! Fields a sub-query needs although the client never selected them: `@requires` inputs,
//! entity keys of split entity selections and `__typename` for abstract selections.

use std::collections::HashMap;

use graphql_parser::query::{Field, InlineFragment, Selection, SelectionSet, TypeCondition};
use hive_fusion_composition::directives::KeyField;
use hive_fusion_composition::selection_map::{
    PathSegment, PathSelection, SelectedObjectValue, SelectedValue, SelectedValueEntry,
    SelectionMap,
};
use hive_fusion_composition::ComposedSchema;
use serde::Serialize;

use crate::planner::assignment::{EntityKeyInjection, TYPENAME_FIELD};

/// A field of `type_name` injected into a sub-query, with the nested fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDependency {
    pub type_name: String,
    pub field_name: String,
    /// Response key decided ahead of injection, used for entity keys.
    pub response_key: Option<String>,
    pub children: Vec<FieldDependency>,
}

impl FieldDependency {
    fn new(type_name: &str, field_name: &str) -> Self {
        FieldDependency {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
            response_key: None,
            children: Vec::new(),
        }
    }
}

/// Where a dependency ended up in a sub-query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedDependency {
    pub path: Vec<String>,
    pub type_name: String,
    pub field_name: String,
}

/// Merges `dependency` into `dependencies`, folding it into an existing dependency on the
/// same field.
pub fn merge_dependency(dependencies: &mut Vec<FieldDependency>, dependency: FieldDependency) {
    let existing = dependencies.iter_mut().find(|existing| {
        existing.type_name == dependency.type_name
            && existing.field_name == dependency.field_name
            && existing.response_key == dependency.response_key
    });
    match existing {
        Some(existing) => {
            for child in dependency.children {
                merge_dependency(&mut existing.children, child);
            }
        }
        None => dependencies.push(dependency),
    }
}

/// Turns a `@requires` selection map declared on a field of `type_name` into the fields it
/// reads.
pub fn selection_map_dependencies(
    schema: &ComposedSchema,
    map: &SelectionMap,
    type_name: &str,
) -> Vec<FieldDependency> {
    let mut dependencies = Vec::new();
    value_dependencies(schema, &map.value, type_name, &mut dependencies);
    dependencies
}

fn value_dependencies(
    schema: &ComposedSchema,
    value: &SelectedValue,
    type_name: &str,
    out: &mut Vec<FieldDependency>,
) {
    for entry in &value.entries {
        match entry {
            SelectedValueEntry::Object(object) => object_dependencies(schema, object, type_name, out),
            SelectedValueEntry::Path { path, selection } => {
                let start = path.type_condition.as_deref().unwrap_or(type_name);
                if let Some(dependency) = path_dependency(schema, &path.segment, start, selection.as_ref()) {
                    merge_dependency(out, dependency);
                }
            }
        }
    }
}

fn object_dependencies(
    schema: &ComposedSchema,
    object: &SelectedObjectValue,
    type_name: &str,
    out: &mut Vec<FieldDependency>,
) {
    for field in &object.fields {
        match &field.value {
            Some(value) => value_dependencies(schema, value, type_name, out),
            None => {
                if schema.field(type_name, &field.name).is_some() {
                    merge_dependency(out, FieldDependency::new(type_name, &field.name));
                }
            }
        }
    }
}

fn path_dependency(
    schema: &ComposedSchema,
    segment: &PathSegment,
    type_name: &str,
    selection: Option<&PathSelection>,
) -> Option<FieldDependency> {
    let field = schema.field(type_name, &segment.field)?;
    let field_type = segment
        .type_condition
        .as_deref()
        .unwrap_or_else(|| field.ty.named_type());

    let mut dependency = FieldDependency::new(type_name, &segment.field);
    match (&segment.next, selection) {
        (Some(next), _) => {
            if let Some(child) = path_dependency(schema, next, field_type, selection) {
                dependency.children.push(child);
            }
        }
        (None, Some(PathSelection::Object(object))) => {
            object_dependencies(schema, object, field_type, &mut dependency.children)
        }
        (None, Some(PathSelection::List(inner))) => {
            value_dependencies(schema, inner, field_type, &mut dependency.children)
        }
        (None, None) => {}
    }
    Some(dependency)
}

/// The key fields of a split entity, under their precomputed response keys.
pub fn entity_key_dependencies(
    schema: &ComposedSchema,
    injection: &EntityKeyInjection,
) -> Vec<FieldDependency> {
    injection
        .fields
        .iter()
        .map(|(key_field, response_key)| {
            let mut dependency = key_dependency(schema, &injection.type_name, key_field);
            dependency.response_key = Some(response_key.clone());
            dependency
        })
        .collect()
}

fn key_dependency(schema: &ComposedSchema, type_name: &str, key_field: &KeyField) -> FieldDependency {
    let mut dependency = FieldDependency::new(type_name, &key_field.name);
    if let Some(field) = schema.field(type_name, &key_field.name) {
        for child in &key_field.children {
            dependency
                .children
                .push(key_dependency(schema, field.ty.named_type(), child));
        }
    }
    dependency
}

/// What a client field occupies at a response key: the field name and whether it has
/// arguments. Injected fields may only share a key with a client field selecting the
/// same value.
pub type ClientKeys<'c> = HashMap<&'c str, (&'c str, bool)>;

/// Injects dependencies into one selection set of a sub-query.
pub struct Injector<'s> {
    pub schema: &'s ComposedSchema,
    /// Name of the source schema the sub-query is sent to.
    pub target: &'s str,
    pub next_alias: &'s mut usize,
    pub injected: Vec<InjectedDependency>,
}

fn response_key<'a>(field: &'a Field<'static, String>) -> &'a str {
    field.alias.as_deref().unwrap_or(&field.name)
}

impl Injector<'_> {
    fn fresh_alias(&mut self) -> String {
        let alias = format!("_fusion_dep_{}", self.next_alias);
        *self.next_alias += 1;
        alias
    }

    fn target_name(&self, type_name: &str, field_name: &str) -> String {
        self.schema
            .field(type_name, field_name)
            .and_then(|field| field.source(self.target))
            .map(|source| source.original_name.clone())
            .unwrap_or_else(|| field_name.to_string())
    }

    /// Injects `dependencies` into `items`, a selection set on `level_type`. Dependencies
    /// declared on another type land in an inline fragment on that type. Returns whether
    /// anything was added.
    pub fn inject(
        &mut self,
        items: &mut Vec<Selection<'static, String>>,
        level_type: &str,
        client_keys: &ClientKeys<'_>,
        dependencies: Vec<FieldDependency>,
        path: &[String],
    ) -> bool {
        let mut changed = false;
        let mut by_type: Vec<(String, Vec<FieldDependency>)> = Vec::new();

        for dependency in dependencies {
            if dependency.type_name == level_type {
                changed |= self.inject_field(items, client_keys, dependency, path);
                continue;
            }
            match by_type
                .iter_mut()
                .find(|(type_name, _)| *type_name == dependency.type_name)
            {
                Some((_, group)) => group.push(dependency),
                None => by_type.push((dependency.type_name.clone(), vec![dependency])),
            }
        }

        for (type_name, group) in by_type {
            let mut fragment_items = Vec::new();
            for dependency in group {
                self.inject_field(&mut fragment_items, client_keys, dependency, path);
            }
            if fragment_items.is_empty() {
                continue;
            }
            items.push(Selection::InlineFragment(InlineFragment {
                position: Default::default(),
                type_condition: Some(TypeCondition::On(type_name)),
                directives: Vec::new(),
                selection_set: SelectionSet {
                    span: Default::default(),
                    items: fragment_items,
                },
            }));
            changed = true;
        }

        changed
    }

    fn inject_field(
        &mut self,
        items: &mut Vec<Selection<'static, String>>,
        client_keys: &ClientKeys<'_>,
        dependency: FieldDependency,
        path: &[String],
    ) -> bool {
        let name = self.target_name(&dependency.type_name, &dependency.field_name);
        let wanted_key = dependency
            .response_key
            .clone()
            .unwrap_or_else(|| dependency.field_name.clone());
        let child_type = self
            .schema
            .field(&dependency.type_name, &dependency.field_name)
            .map(|field| field.ty.named_type().to_string())
            .unwrap_or_default();

        let existing = items.iter_mut().find_map(|item| match item {
            Selection::Field(field) if response_key(field) == wanted_key => Some(field),
            _ => None,
        });
        if let Some(existing) = existing {
            if existing.name == name && existing.arguments.is_empty() {
                let mut child_path = path.to_vec();
                child_path.push(wanted_key);
                return self.inject(
                    &mut existing.selection_set.items,
                    &child_type,
                    &ClientKeys::new(),
                    dependency.children,
                    &child_path,
                );
            }
        }

        let taken_by_client = client_keys
            .get(wanted_key.as_str())
            .is_some_and(|(field_name, has_arguments)| {
                *field_name != dependency.field_name || *has_arguments
            });
        let taken_by_sub_query = items.iter().any(|item| match item {
            Selection::Field(field) => response_key(field) == wanted_key,
            _ => false,
        });
        let key = if dependency.response_key.is_none() && (taken_by_client || taken_by_sub_query) {
            self.fresh_alias()
        } else {
            wanted_key
        };

        let mut child_path = path.to_vec();
        child_path.push(key.clone());
        let mut children = Vec::new();
        self.inject(
            &mut children,
            &child_type,
            &ClientKeys::new(),
            dependency.children,
            &child_path,
        );

        self.injected.push(InjectedDependency {
            path: child_path,
            type_name: dependency.type_name,
            field_name: dependency.field_name,
        });
        items.push(Selection::Field(Field {
            position: Default::default(),
            alias: (key != name).then_some(key),
            name,
            arguments: Vec::new(),
            directives: Vec::new(),
            selection_set: SelectionSet {
                span: Default::default(),
                items: children,
            },
        }));
        true
    }

    /// Adds `__typename` to an abstract selection that branches on type conditions, so the
    /// branches can be told apart when the response is projected.
    pub fn inject_typename(
        &mut self,
        items: &mut Vec<Selection<'static, String>>,
        level_type: &str,
        path: &[String],
    ) -> bool {
        if !self.schema.is_abstract_type(level_type) {
            return false;
        }
        let has_type_conditions = items
            .iter()
            .any(|item| !matches!(item, Selection::Field(_)));
        let has_typename = items.iter().any(|item| match item {
            Selection::Field(field) => response_key(field) == TYPENAME_FIELD,
            _ => false,
        });
        if !has_type_conditions || has_typename {
            return false;
        }

        let mut typename_path = path.to_vec();
        typename_path.push(TYPENAME_FIELD.to_string());
        self.injected.push(InjectedDependency {
            path: typename_path,
            type_name: level_type.to_string(),
            field_name: TYPENAME_FIELD.to_string(),
        });
        items.push(Selection::Field(Field {
            position: Default::default(),
            alias: None,
            name: TYPENAME_FIELD.to_string(),
            arguments: Vec::new(),
            directives: Vec::new(),
            selection_set: SelectionSet {
                span: Default::default(),
                items: Vec::new(),
            },
        }));
        true
    }
}
