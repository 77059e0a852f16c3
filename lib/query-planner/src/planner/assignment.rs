//! Owner assignment: decides, for every field of the client operation, which source schemas
//! the field is fetched from.
//!
//! A root field may be fetched from every schema resolving it. Below it, a field can only be
//! fetched from the schemas that also resolved its parent, its *reach*. Leaves are owned by
//! exactly one schema, preferring a schema that a preceding sibling, or a preceding field of an
//! enclosing selection set, already uses. Selections then spread over as few sub-queries as
//! possible.

use std::collections::{BTreeSet, HashMap};

use graphql_parser::query::{Field, FragmentDefinition, FragmentSpread, InlineFragment, Selection, TypeCondition};
use hive_fusion_composition::directives::KeyField;
use hive_fusion_composition::schema::{FieldDefinition, TypeDefinition, TypeKind};
use hive_fusion_composition::selection_map::SchemaView;
use hive_fusion_composition::{ComposedSchema, SchemaCoordinate};
use tracing::trace;

use crate::error::ExtractionError;
use crate::operation::ClientOperation;

/// Source schemas as indices into the composition order.
pub type SchemaSet = BTreeSet<usize>;

pub const TYPENAME_FIELD: &str = "__typename";

/// Key fields injected into every sub-query selecting a split entity, so that list items can
/// be correlated when the partial results are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKeyInjection {
    pub type_name: String,
    /// Key field and the response key it is injected under.
    pub fields: Vec<(KeyField, String)>,
}

#[derive(Debug)]
pub struct AssignedField<'a> {
    pub field: &'a Field<'static, String>,
    /// The type the field is selected on.
    pub parent_type: &'a str,
    /// `None` for `__typename`.
    pub definition: Option<&'a FieldDefinition>,
    pub response_path: Vec<String>,
    pub schemas: SchemaSet,
    pub children: Vec<AssignedSelection<'a>>,
    pub entity_key: Option<EntityKeyInjection>,
}

impl AssignedField<'_> {
    pub fn response_key(&self) -> &str {
        self.field.alias.as_deref().unwrap_or(&self.field.name)
    }

    /// The named type of the field's selection set.
    pub fn output_type(&self) -> &str {
        match self.definition {
            Some(definition) => definition.ty.named_type(),
            None => "String",
        }
    }
}

#[derive(Debug)]
pub enum AssignedSelection<'a> {
    Field(AssignedField<'a>),
    InlineFragment {
        fragment: &'a InlineFragment<'static, String>,
        type_condition: &'a str,
        schemas: SchemaSet,
        children: Vec<AssignedSelection<'a>>,
    },
    FragmentSpread {
        spread: &'a FragmentSpread<'static, String>,
        definition: &'a FragmentDefinition<'static, String>,
        type_condition: &'a str,
        schemas: SchemaSet,
        children: Vec<AssignedSelection<'a>>,
    },
}

impl<'a> AssignedSelection<'a> {
    pub fn schemas(&self) -> &SchemaSet {
        match self {
            AssignedSelection::Field(field) => &field.schemas,
            AssignedSelection::InlineFragment { schemas, .. }
            | AssignedSelection::FragmentSpread { schemas, .. } => schemas,
        }
    }
}

/// Fields of a selection set, looking through inline fragments and fragment spreads.
pub fn level_fields<'b, 'a>(selections: &'b [AssignedSelection<'a>]) -> Vec<&'b AssignedField<'a>> {
    let mut fields = Vec::new();
    for selection in selections {
        match selection {
            AssignedSelection::Field(field) => fields.push(field),
            AssignedSelection::InlineFragment { children, .. }
            | AssignedSelection::FragmentSpread { children, .. } => {
                fields.extend(level_fields(children))
            }
        }
    }
    fields
}

/// Whether a root field keeps every schema resolving it in reach, or is pinned to the first
/// one (mutations, whose root fields run one after the other on a single schema each).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootReach {
    AllResolvers,
    FirstResolver,
}

pub struct Assigner<'a> {
    schema: &'a ComposedSchema,
    operation: &'a ClientOperation,
    root_reach: RootReach,
    next_alias: usize,
}

impl<'a> Assigner<'a> {
    pub fn new(schema: &'a ComposedSchema, operation: &'a ClientOperation, root_reach: RootReach) -> Self {
        Assigner {
            schema,
            operation,
            root_reach,
            next_alias: 0,
        }
    }

    /// The next free `_fusion_dep_<n>` alias counter, shared with extraction so aliases stay
    /// unique within the plan.
    pub fn next_alias(&self) -> usize {
        self.next_alias
    }

    pub fn assign_root(
        &mut self,
        root_type: &'a TypeDefinition,
    ) -> Result<Vec<AssignedSelection<'a>>, ExtractionError> {
        let reach: SchemaSet = (0..self.schema.source_schemas().len()).collect();
        let mut used = Vec::new();
        let mut fragment_path = Vec::new();
        let operation = self.operation;
        self.assign_selections(
            &operation.selection_set.items,
            &root_type.name,
            &reach,
            &[],
            true,
            &mut fragment_path,
            &mut used,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assign_selections(
        &mut self,
        items: &'a [Selection<'static, String>],
        parent_type: &'a str,
        reach: &SchemaSet,
        path: &[String],
        is_root: bool,
        fragment_path: &mut Vec<&'a str>,
        used: &mut Vec<usize>,
    ) -> Result<Vec<AssignedSelection<'a>>, ExtractionError> {
        let mut assigned = Vec::with_capacity(items.len());

        for selection in items {
            match selection {
                Selection::Field(field) => {
                    let field = self.assign_field(
                        field,
                        parent_type,
                        reach,
                        path,
                        is_root,
                        fragment_path,
                        used,
                    )?;
                    assigned.push(AssignedSelection::Field(field));
                }
                Selection::InlineFragment(fragment) => {
                    let type_condition = match &fragment.type_condition {
                        Some(TypeCondition::On(name)) => name.as_str(),
                        None => parent_type,
                    };
                    self.expect_type(type_condition)?;
                    let children = self.assign_selections(
                        &fragment.selection_set.items,
                        type_condition,
                        reach,
                        path,
                        is_root,
                        fragment_path,
                        used,
                    )?;
                    assigned.push(AssignedSelection::InlineFragment {
                        fragment,
                        type_condition,
                        schemas: union_of(&children),
                        children,
                    });
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name.as_str();
                    if let Some(start) = fragment_path.iter().position(|visited| *visited == name) {
                        let mut cycle = fragment_path[start..]
                            .iter()
                            .map(|visited| visited.to_string())
                            .collect::<Vec<_>>();
                        cycle.push(name.to_string());
                        return Err(ExtractionError::FragmentCycle { cycle });
                    }

                    let definition = self.operation.fragment(name)?;
                    let TypeCondition::On(type_condition) = &definition.type_condition;
                    self.expect_type(type_condition)?;

                    fragment_path.push(name);
                    let children = self.assign_selections(
                        &definition.selection_set.items,
                        type_condition,
                        reach,
                        path,
                        is_root,
                        fragment_path,
                        used,
                    )?;
                    fragment_path.pop();

                    assigned.push(AssignedSelection::FragmentSpread {
                        spread,
                        definition,
                        type_condition,
                        schemas: union_of(&children),
                        children,
                    });
                }
            }
        }

        Ok(assigned)
    }

    fn expect_type(&self, name: &str) -> Result<&'a TypeDefinition, ExtractionError> {
        self.schema
            .type_definition(name)
            .filter(|definition| definition.is_accessible())
            .ok_or_else(|| ExtractionError::UnknownType {
                type_name: name.to_string(),
            })
    }

    #[allow(clippy::too_many_arguments)]
    fn assign_field(
        &mut self,
        field: &'a Field<'static, String>,
        parent_type: &'a str,
        reach: &SchemaSet,
        path: &[String],
        is_root: bool,
        fragment_path: &mut Vec<&'a str>,
        used: &mut Vec<usize>,
    ) -> Result<AssignedField<'a>, ExtractionError> {
        let mut response_path = path.to_vec();
        response_path.push(field.alias.clone().unwrap_or_else(|| field.name.clone()));
        let coordinate = SchemaCoordinate::member(parent_type, &field.name);

        if field.name == TYPENAME_FIELD {
            let candidates = reach.iter().copied().collect::<Vec<_>>();
            let owner = pick_owner(&candidates, used).ok_or_else(|| {
                ExtractionError::UnresolvableField {
                    coordinate: coordinate.clone(),
                    path: response_path.join("."),
                }
            })?;
            remember(used, owner);
            return Ok(AssignedField {
                field,
                parent_type,
                definition: None,
                response_path,
                schemas: SchemaSet::from([owner]),
                children: Vec::new(),
                entity_key: None,
            });
        }

        let definition = self
            .expect_type(parent_type)?
            .field(&field.name)
            .filter(|definition| definition.is_accessible())
            .ok_or_else(|| ExtractionError::UnknownField {
                coordinate: coordinate.clone(),
                path: response_path.join("."),
            })?;

        let mut candidates = definition
            .sources
            .iter()
            .filter_map(|source| self.schema.source_schema_index(&source.schema))
            .filter(|index| reach.contains(index))
            .collect::<Vec<_>>();
        candidates.sort_unstable();
        candidates.dedup();
        if is_root && self.root_reach == RootReach::FirstResolver {
            candidates.truncate(1);
        }

        if candidates.is_empty() {
            return Err(ExtractionError::UnresolvableField {
                coordinate,
                path: response_path.join("."),
            });
        }

        if field.selection_set.items.is_empty() {
            let owner = pick_owner(&candidates, used).unwrap_or(candidates[0]);
            remember(used, owner);
            trace!(path = %response_path.join("."), owner, "assigned leaf");
            return Ok(AssignedField {
                field,
                parent_type,
                definition: Some(definition),
                response_path,
                schemas: SchemaSet::from([owner]),
                children: Vec::new(),
                entity_key: None,
            });
        }

        let output_type = definition.ty.named_type();
        let child_reach: SchemaSet = candidates.iter().copied().collect();
        let mut child_used = used.clone();
        let children = self.assign_selections(
            &field.selection_set.items,
            output_type,
            &child_reach,
            &response_path,
            false,
            fragment_path,
            &mut child_used,
        )?;
        let schemas = union_of(&children);
        for schema in &schemas {
            remember(used, *schema);
        }

        let entity_key = if schemas.len() > 1 {
            self.entity_key(output_type, &schemas, &children)
        } else {
            None
        };

        Ok(AssignedField {
            field,
            parent_type,
            definition: Some(definition),
            response_path,
            schemas,
            children,
            entity_key,
        })
    }

    /// Picks the first key of an entity every participating schema can resolve and chooses
    /// response keys that do not collide with what the client selects.
    fn entity_key(
        &mut self,
        type_name: &str,
        schemas: &SchemaSet,
        children: &[AssignedSelection<'a>],
    ) -> Option<EntityKeyInjection> {
        let definition = self.schema.type_definition(type_name)?;
        if definition.kind != TypeKind::Object {
            return None;
        }
        let schema_names = schemas
            .iter()
            .filter_map(|index| self.schema.source_schemas().get(*index))
            .map(String::as_str)
            .collect::<Vec<_>>();

        let key_fields = definition.directives.keys.iter().find_map(|key| {
            key.selection
                .as_ref()
                .ok()
                .filter(|fields| self.is_key_resolvable(type_name, fields, &schema_names))
        })?;

        let client_keys: HashMap<&str, &AssignedField<'a>> = level_fields(children)
            .into_iter()
            .map(|field| (field.response_key(), field))
            .collect();

        let fields = key_fields
            .iter()
            .map(|key_field| {
                let response_key = match client_keys.get(key_field.name.as_str()) {
                    Some(client)
                        if client.field.name != key_field.name || !client.field.arguments.is_empty() =>
                    {
                        let alias = format!("_fusion_dep_{}", self.next_alias);
                        self.next_alias += 1;
                        alias
                    }
                    _ => key_field.name.clone(),
                };
                (key_field.clone(), response_key)
            })
            .collect();

        Some(EntityKeyInjection {
            type_name: type_name.to_string(),
            fields,
        })
    }

    fn is_key_resolvable(&self, type_name: &str, fields: &[KeyField], schemas: &[&str]) -> bool {
        fields.iter().all(|key_field| {
            let Some(field) = self.schema.field(type_name, &key_field.name) else {
                return false;
            };
            schemas.iter().all(|schema| field.is_resolved_by(schema))
                && (key_field.children.is_empty()
                    || self.is_key_resolvable(field.ty.named_type(), &key_field.children, schemas))
        })
    }
}

fn pick_owner(candidates: &[usize], used: &[usize]) -> Option<usize> {
    candidates
        .iter()
        .find(|candidate| used.contains(candidate))
        .or_else(|| candidates.first())
        .copied()
}

fn remember(used: &mut Vec<usize>, schema: usize) {
    if !used.contains(&schema) {
        used.push(schema);
    }
}

fn union_of(children: &[AssignedSelection<'_>]) -> SchemaSet {
    children
        .iter()
        .flat_map(|child| child.schemas().iter().copied())
        .collect()
}
