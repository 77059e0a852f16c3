//! Rewrites the assigned client operation into the sub-document sent to one source schema.
//!
//! Only the selections whose owner set contains the target are kept. Fields are renamed to
//! the target's original names behind an alias carrying the client response key, composition
//! directives are dropped, and the dependencies of what is kept are injected. The result is a
//! self-contained document: every variable and fragment it references is defined in it.

use graphql_parser::query::{
    Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    Mutation, OperationDefinition, Query, Selection, SelectionSet, TypeCondition,
};
use hive_fusion_composition::directives::is_composition_directive;
use hive_fusion_composition::ComposedSchema;
use indexmap::{IndexMap, IndexSet};
use tracing::{instrument, trace};

use crate::error::ExtractionError;
use crate::operation::{ClientOperation, OperationKind};
use crate::planner::assignment::{level_fields, AssignedField, AssignedSelection};

pub mod dependencies;
pub mod variables;

use dependencies::{
    entity_key_dependencies, merge_dependency, selection_map_dependencies, ClientKeys,
    FieldDependency, InjectedDependency, Injector,
};
use variables::{field_usage, filter_variable_definitions};

/// A root field of the client operation, with the directives of the root fragments it was
/// selected through.
#[derive(Debug)]
pub struct RootField<'r, 'a> {
    pub field: &'r AssignedField<'a>,
    pub inherited_directives: Vec<Directive<'static, String>>,
}

/// Root fields in selection order, looking through root fragments.
pub fn root_fields<'r, 'a>(selections: &'r [AssignedSelection<'a>]) -> Vec<RootField<'r, 'a>> {
    let mut fields = Vec::new();
    collect_root_fields(selections, &[], &mut fields);
    fields
}

fn collect_root_fields<'r, 'a>(
    selections: &'r [AssignedSelection<'a>],
    inherited: &[Directive<'static, String>],
    out: &mut Vec<RootField<'r, 'a>>,
) {
    for selection in selections {
        match selection {
            AssignedSelection::Field(field) => out.push(RootField {
                field,
                inherited_directives: inherited.to_vec(),
            }),
            AssignedSelection::InlineFragment {
                fragment, children, ..
            } => {
                let mut directives = inherited.to_vec();
                directives.extend(fragment.directives.iter().cloned());
                collect_root_fields(children, &directives, out);
            }
            AssignedSelection::FragmentSpread {
                spread,
                definition,
                children,
                ..
            } => {
                let mut directives = inherited.to_vec();
                directives.extend(spread.directives.iter().cloned());
                directives.extend(definition.directives.iter().cloned());
                collect_root_fields(children, &directives, out);
            }
        }
    }
}

/// One root field of a sub-query in source-schema form.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    pub field: Field<'static, String>,
    pub variables: IndexSet<String>,
    pub fragments: IndexSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedOperation {
    pub document: Document<'static, String>,
    pub fields: Vec<ExtractedField>,
    pub variables: Vec<String>,
    /// Client response keys of the root fields, used to attribute transport failures.
    pub root_response_keys: Vec<String>,
    pub dependencies: Vec<InjectedDependency>,
}

pub struct Extractor<'e> {
    schema: &'e ComposedSchema,
    operation: &'e ClientOperation,
    target: usize,
    injector: Injector<'e>,
    fragments: IndexMap<String, FragmentDefinition<'static, String>>,
}

fn strip_directives(directives: &[Directive<'static, String>]) -> Vec<Directive<'static, String>> {
    directives
        .iter()
        .filter(|directive| !is_composition_directive(&directive.name))
        .cloned()
        .collect()
}

fn client_keys<'c>(selections: &'c [AssignedSelection<'_>]) -> ClientKeys<'c> {
    level_fields(selections)
        .into_iter()
        .map(|field| {
            (
                field.response_key(),
                (field.field.name.as_str(), !field.field.arguments.is_empty()),
            )
        })
        .collect()
}

impl<'e> Extractor<'e> {
    pub fn new(
        schema: &'e ComposedSchema,
        operation: &'e ClientOperation,
        target: usize,
        next_alias: &'e mut usize,
    ) -> Self {
        let target_name = schema
            .source_schemas()
            .get(target)
            .map(String::as_str)
            .unwrap_or_default();
        Extractor {
            schema,
            operation,
            target,
            injector: Injector {
                schema,
                target: target_name,
                next_alias,
                injected: Vec::new(),
            },
            fragments: IndexMap::new(),
        }
    }

    /// Extracts the given root fields of `root_type` for the target schema.
    #[instrument(level = "trace", skip_all, fields(target = self.injector.target))]
    pub fn extract(
        mut self,
        root_type: &str,
        roots: &[RootField<'_, '_>],
    ) -> Result<ExtractedOperation, ExtractionError> {
        let mut items = Vec::new();
        let mut root_response_keys = Vec::new();
        let mut client_root_keys = ClientKeys::new();

        for root in roots {
            let field = root.field;
            client_root_keys.insert(
                field.response_key(),
                (field.field.name.as_str(), !field.field.arguments.is_empty()),
            );
            if !field.schemas.contains(&self.target) {
                continue;
            }
            let (mut rewritten, _) = self.extract_field(field);
            rewritten
                .directives
                .extend(strip_directives(&root.inherited_directives));
            root_response_keys.push(field.response_key().to_string());
            items.push(Selection::Field(rewritten));
        }

        let root_dependencies = self.level_requirements(roots.iter().map(|root| root.field), None);
        self.injector
            .inject(&mut items, root_type, &client_root_keys, root_dependencies, &[]);

        let mut fields = Vec::new();
        let mut used_variables = IndexSet::new();
        for item in &items {
            if let Selection::Field(field) = item {
                let usage = field_usage(field, &self.fragments);
                used_variables.extend(usage.variables.iter().cloned());
                fields.push(ExtractedField {
                    field: field.clone(),
                    variables: usage.variables,
                    fragments: usage.fragments,
                });
            }
        }

        let variable_definitions =
            filter_variable_definitions(&self.operation.variable_definitions, &used_variables)?;
        let variables = variable_definitions
            .iter()
            .map(|definition| definition.name.clone())
            .collect::<Vec<_>>();
        let variable_definitions = variable_definitions.into_iter().cloned().collect::<Vec<_>>();

        let selection_set = SelectionSet {
            span: Default::default(),
            items,
        };
        let operation = match self.operation.kind {
            OperationKind::Mutation => OperationDefinition::Mutation(Mutation {
                position: Default::default(),
                name: self.operation.name.clone(),
                variable_definitions,
                directives: Vec::new(),
                selection_set,
            }),
            _ if self.operation.name.is_none() && variable_definitions.is_empty() => {
                OperationDefinition::SelectionSet(selection_set)
            }
            _ => OperationDefinition::Query(Query {
                position: Default::default(),
                name: self.operation.name.clone(),
                variable_definitions,
                directives: Vec::new(),
                selection_set,
            }),
        };

        let mut definitions = vec![Definition::Operation(operation)];
        definitions.extend(self.fragments.into_values().map(Definition::Fragment));
        let document = Document { definitions };

        trace!(fields = fields.len(), variables = variables.len(), "extracted sub-query");

        Ok(ExtractedOperation {
            document,
            fields,
            variables,
            root_response_keys,
            dependencies: self.injector.injected,
        })
    }

    /// Returns the rewritten field and whether it is exactly the client's field: every
    /// nested selection kept and nothing injected.
    fn extract_field(&mut self, assigned: &AssignedField<'_>) -> (Field<'static, String>, bool) {
        let client = assigned.field;
        let target_name = self.injector.target;
        let name = assigned
            .definition
            .and_then(|definition| definition.source(target_name))
            .map(|source| source.original_name.clone())
            .unwrap_or_else(|| client.name.clone());
        let alias = if name != client.name {
            Some(assigned.response_key().to_string())
        } else {
            client.alias.clone()
        };

        let mut complete = true;
        let mut items = Vec::new();
        if !assigned.children.is_empty() {
            let output_type = assigned.output_type();
            let (children, children_complete) =
                self.extract_selections(&assigned.children, output_type);
            items = children;
            complete &= children_complete;

            let dependencies = self.level_requirements(
                level_fields(&assigned.children).into_iter(),
                assigned.entity_key.as_ref().map(|key| entity_key_dependencies(self.schema, key)),
            );
            let keys = client_keys(&assigned.children);
            let injected = self.injector.inject(
                &mut items,
                output_type,
                &keys,
                dependencies,
                &assigned.response_path,
            );
            let typename_injected =
                self.injector
                    .inject_typename(&mut items, output_type, &assigned.response_path);
            complete &= !injected && !typename_injected;
        }

        let field = Field {
            position: client.position,
            alias,
            name,
            arguments: client.arguments.clone(),
            directives: strip_directives(&client.directives),
            selection_set: SelectionSet {
                span: client.selection_set.span,
                items,
            },
        };
        (field, complete)
    }

    /// `@requires` dependencies of the fields kept at one level, after the entity key.
    fn level_requirements<'f, 'a: 'f>(
        &self,
        fields: impl Iterator<Item = &'f AssignedField<'a>>,
        entity_key: Option<Vec<FieldDependency>>,
    ) -> Vec<FieldDependency> {
        let target_name = self.injector.target;
        let mut dependencies = entity_key.unwrap_or_default();
        for field in fields {
            if !field.schemas.contains(&self.target) {
                continue;
            }
            let map = field
                .definition
                .and_then(|definition| definition.source(target_name))
                .and_then(|source| source.requires.as_ref())
                .and_then(|requires| requires.field.parsed.as_ref().ok());
            if let Some(map) = map {
                for dependency in selection_map_dependencies(self.schema, map, field.parent_type) {
                    merge_dependency(&mut dependencies, dependency);
                }
            }
        }
        dependencies
    }

    fn extract_selections(
        &mut self,
        selections: &[AssignedSelection<'_>],
        parent_type: &str,
    ) -> (Vec<Selection<'static, String>>, bool) {
        let mut items = Vec::new();
        let mut complete = true;

        for selection in selections {
            if !selection.schemas().contains(&self.target) {
                complete = false;
                continue;
            }
            match selection {
                AssignedSelection::Field(field) => {
                    let (rewritten, field_complete) = self.extract_field(field);
                    complete &= field_complete;
                    items.push(Selection::Field(rewritten));
                }
                AssignedSelection::InlineFragment {
                    fragment,
                    type_condition,
                    children,
                    ..
                } => {
                    let (children, children_complete) =
                        self.extract_selections(children, type_condition);
                    complete &= children_complete;
                    items.push(Selection::InlineFragment(InlineFragment {
                        position: fragment.position,
                        type_condition: fragment.type_condition.clone(),
                        directives: strip_directives(&fragment.directives),
                        selection_set: SelectionSet {
                            span: fragment.selection_set.span,
                            items: children,
                        },
                    }));
                }
                AssignedSelection::FragmentSpread {
                    spread,
                    definition,
                    type_condition,
                    children,
                    ..
                } => {
                    let (children, children_complete) =
                        self.extract_selections(children, type_condition);
                    if children_complete {
                        if !self.fragments.contains_key(&definition.name) {
                            self.fragments.insert(
                                definition.name.clone(),
                                FragmentDefinition {
                                    position: definition.position,
                                    name: definition.name.clone(),
                                    type_condition: definition.type_condition.clone(),
                                    directives: strip_directives(&definition.directives),
                                    selection_set: SelectionSet {
                                        span: definition.selection_set.span,
                                        items: children,
                                    },
                                },
                            );
                        }
                        items.push(Selection::FragmentSpread(FragmentSpread {
                            position: spread.position,
                            fragment_name: spread.fragment_name.clone(),
                            directives: strip_directives(&spread.directives),
                        }));
                    } else {
                        complete = false;
                        let mut directives = strip_directives(&spread.directives);
                        directives.extend(strip_directives(&definition.directives));
                        items.push(Selection::InlineFragment(InlineFragment {
                            position: spread.position,
                            type_condition: Some(TypeCondition::On(type_condition.to_string())),
                            directives,
                            selection_set: SelectionSet {
                                span: definition.selection_set.span,
                                items: children,
                            },
                        }));
                    }
                }
            }
        }

        trace!(parent_type, kept = items.len(), complete, "extracted selection set");
        (items, complete)
    }
}
