use std::collections::BTreeSet;
use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};

use graphql_parser::query::Document;
use hive_fusion_composition::{ComposedSchema, RootOperationKind};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::ExtractionError;
use crate::extraction::dependencies::InjectedDependency;
use crate::extraction::{root_fields, ExtractedField, Extractor, RootField};
use crate::operation::{ClientOperation, OperationKind};
use crate::utils::pretty_display::{get_indent, write_indented, PrettyDisplay};

pub mod assignment;

use assignment::{AssignedSelection, Assigner, RootReach};

/// One self-contained operation sent to one source schema.
#[derive(Debug, Clone, Serialize)]
pub struct SubQuery {
    pub id: usize,
    pub source_schema: String,
    /// Sub-queries of the same group run concurrently, groups run in order.
    pub group: usize,
    #[serde(skip)]
    pub document: Document<'static, String>,
    #[serde(rename = "document")]
    pub document_str: String,
    #[serde(skip)]
    pub fields: Vec<ExtractedField>,
    pub variables: Vec<String>,
    pub root_response_keys: Vec<String>,
    pub dependencies: Vec<InjectedDependency>,
}

/// Key fields injected under `path` so that lists of `type_name` coming from different
/// sub-queries can be matched item by item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityKeyHint {
    pub path: Vec<String>,
    pub type_name: String,
    pub key_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationPlan {
    pub kind: OperationKind,
    pub operation_name: Option<String>,
    pub sub_queries: Vec<SubQuery>,
    pub entity_keys: Vec<EntityKeyHint>,
}

impl OperationPlan {
    /// Group numbers in execution order.
    pub fn groups(&self) -> BTreeSet<usize> {
        self.sub_queries.iter().map(|sub_query| sub_query.group).collect()
    }

    pub fn sub_queries_in_group(&self, group: usize) -> impl Iterator<Item = &SubQuery> {
        self.sub_queries
            .iter()
            .filter(move |sub_query| sub_query.group == group)
    }
}

/// Parses `source`, selects the operation and plans it.
pub fn plan(
    schema: &ComposedSchema,
    source: &str,
    operation_name: Option<&str>,
) -> Result<OperationPlan, ExtractionError> {
    let operation = ClientOperation::parse(source, operation_name)?;
    plan_operation(schema, &operation)
}

/// Splits a client operation into one sub-query per source schema it touches.
///
/// Queries produce one sub-query per source schema, all in the same group. Mutation root
/// fields must run one after the other, so every root field gets its own sub-query and
/// group, sent to the first source schema resolving it.
#[instrument(level = "trace", skip_all, fields(operation_name = operation.name.as_deref()))]
pub fn plan_operation(
    schema: &ComposedSchema,
    operation: &ClientOperation,
) -> Result<OperationPlan, ExtractionError> {
    let (root_kind, root_reach) = match operation.kind {
        OperationKind::Query => (RootOperationKind::Query, RootReach::AllResolvers),
        OperationKind::Mutation => (RootOperationKind::Mutation, RootReach::FirstResolver),
        OperationKind::Subscription => {
            return Err(ExtractionError::UnsupportedOperationKind {
                kind: operation.kind.as_str(),
            })
        }
    };
    let root_type = schema
        .root_type(root_kind)
        .filter(|definition| definition.is_accessible())
        .ok_or(ExtractionError::RootTypeNotFound {
            kind: operation.kind.as_str(),
        })?;

    let mut assigner = Assigner::new(schema, operation, root_reach);
    let assigned = assigner.assign_root(root_type)?;
    let mut next_alias = assigner.next_alias();

    let mut entity_keys = Vec::new();
    collect_entity_keys(&assigned, &mut entity_keys);

    let roots = root_fields(&assigned);
    let mut sub_queries = Vec::new();

    match operation.kind {
        OperationKind::Mutation => {
            for (group, root) in roots.iter().enumerate() {
                let Some(target) = root.field.schemas.iter().next().copied() else {
                    continue;
                };
                let single = [RootField {
                    field: root.field,
                    inherited_directives: root.inherited_directives.clone(),
                }];
                let sub_query = build_sub_query(
                    schema,
                    operation,
                    &root_type.name,
                    &single,
                    target,
                    sub_queries.len(),
                    group,
                    &mut next_alias,
                )?;
                sub_queries.push(sub_query);
            }
        }
        _ => {
            let targets: BTreeSet<usize> = roots
                .iter()
                .flat_map(|root| root.field.schemas.iter().copied())
                .collect();
            for target in targets {
                let sub_query = build_sub_query(
                    schema,
                    operation,
                    &root_type.name,
                    &roots,
                    target,
                    sub_queries.len(),
                    0,
                    &mut next_alias,
                )?;
                sub_queries.push(sub_query);
            }
        }
    }

    debug!(
        kind = %operation.kind,
        sub_queries = sub_queries.len(),
        entity_keys = entity_keys.len(),
        "operation planned"
    );

    Ok(OperationPlan {
        kind: operation.kind,
        operation_name: operation.name.clone(),
        sub_queries,
        entity_keys,
    })
}

#[allow(clippy::too_many_arguments)]
fn build_sub_query(
    schema: &ComposedSchema,
    operation: &ClientOperation,
    root_type: &str,
    roots: &[RootField<'_, '_>],
    target: usize,
    id: usize,
    group: usize,
    next_alias: &mut usize,
) -> Result<SubQuery, ExtractionError> {
    let extracted = Extractor::new(schema, operation, target, next_alias).extract(root_type, roots)?;
    let source_schema = schema
        .source_schemas()
        .get(target)
        .cloned()
        .unwrap_or_default();

    Ok(SubQuery {
        id,
        source_schema,
        group,
        document_str: extracted.document.to_string(),
        document: extracted.document,
        fields: extracted.fields,
        variables: extracted.variables,
        root_response_keys: extracted.root_response_keys,
        dependencies: extracted.dependencies,
    })
}

fn collect_entity_keys(selections: &[AssignedSelection<'_>], out: &mut Vec<EntityKeyHint>) {
    for selection in selections {
        match selection {
            AssignedSelection::Field(field) => {
                if let Some(entity_key) = &field.entity_key {
                    out.push(EntityKeyHint {
                        path: field.response_path.clone(),
                        type_name: entity_key.type_name.clone(),
                        key_fields: entity_key
                            .fields
                            .iter()
                            .map(|(_, response_key)| response_key.clone())
                            .collect(),
                    });
                }
                collect_entity_keys(&field.children, out);
            }
            AssignedSelection::InlineFragment { children, .. }
            | AssignedSelection::FragmentSpread { children, .. } => {
                collect_entity_keys(children, out)
            }
        }
    }
}

impl Display for OperationPlan {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl Display for SubQuery {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl PrettyDisplay for OperationPlan {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}OperationPlan(kind: {}) {{", self.kind)?;
        for sub_query in &self.sub_queries {
            sub_query.pretty_fmt(f, depth + 1)?;
        }
        for hint in &self.entity_keys {
            writeln!(
                f,
                "{indent}  EntityKey(path: \"{}\", type: {}, fields: [{}]),",
                hint.path.join("."),
                hint.type_name,
                hint.key_fields.join(", ")
            )?;
        }
        writeln!(f, "{indent}}},")
    }
}

impl PrettyDisplay for SubQuery {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(
            f,
            "{indent}SubQuery(id: {}, schema: \"{}\", group: {}) {{",
            self.id, self.source_schema, self.group
        )?;
        write_indented(f, &self.document_str, depth + 1)?;
        writeln!(f, "{indent}}},")
    }
}
