use graphql_parser::query::{Field, Selection, SelectionSet, TypeCondition};
use hive_fusion_composition::selection_map::SchemaView;
use hive_fusion_composition::{ComposedSchema, RootOperationKind, TypeRef};
use hive_fusion_query_planner::{ClientOperation, OperationKind};
use indexmap::IndexMap;
use tracing::{instrument, trace};

use crate::projection::conditions::FieldConditions;
use crate::response::error_normalization::{locate_client_field, ErrorCode};
use crate::response::graphql_error::{GraphQLError, GraphQLErrorPathSegment};
use crate::response::value::Value;

const TYPENAME_FIELD_NAME: &str = "__typename";

type FieldsByResponseKey<'a> = IndexMap<&'a str, Vec<&'a Field<'static, String>>>;

/// Shapes the merged sub-query results into exactly what the client selected.
///
/// Fields injected for dependencies are never selected by the client and so never make
/// it into the output. A null in a non-null position nulls the closest nullable parent;
/// semantically non-null positions stay null, since an error was already reported for them.
#[instrument(level = "trace", skip_all)]
pub fn project_by_operation(
    schema: &ComposedSchema,
    operation: &ClientOperation,
    data: &Value,
    variables: &IndexMap<String, Value>,
    errors: &mut Vec<GraphQLError>,
) -> Value {
    let root_kind = match operation.kind {
        OperationKind::Mutation => RootOperationKind::Mutation,
        OperationKind::Subscription => RootOperationKind::Subscription,
        OperationKind::Query => RootOperationKind::Query,
    };
    let Some(root_type) = schema.root_type(root_kind) else {
        return Value::Null;
    };
    if !data.is_object() {
        return Value::Null;
    }

    let mut projection = ResponseProjection {
        schema,
        operation,
        conditions: FieldConditions::new(operation, variables),
        errors,
    };
    projection
        .complete_object(&root_type.name, data, &[&operation.selection_set], &mut Vec::new())
        .unwrap_or(Value::Null)
}

struct ResponseProjection<'a, 'e> {
    schema: &'a ComposedSchema,
    operation: &'a ClientOperation,
    conditions: FieldConditions<'a>,
    errors: &'e mut Vec<GraphQLError>,
}

impl<'a> ResponseProjection<'a, '_> {
    fn type_applies(&self, type_condition: &str, runtime_type: &str) -> bool {
        type_condition == runtime_type || self.schema.is_possible_type(type_condition, runtime_type)
    }

    fn collect_fields(
        &self,
        runtime_type: &str,
        selection_set: &'a SelectionSet<'static, String>,
        fields: &mut FieldsByResponseKey<'a>,
        visited_fragments: &mut Vec<&'a str>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    if !self.conditions.is_included(&field.directives) {
                        continue;
                    }
                    let response_key = field.alias.as_deref().unwrap_or(field.name.as_str());
                    fields.entry(response_key).or_default().push(field);
                }
                Selection::InlineFragment(fragment) => {
                    if !self.conditions.is_included(&fragment.directives) {
                        continue;
                    }
                    let applies = match &fragment.type_condition {
                        Some(TypeCondition::On(type_condition)) => {
                            self.type_applies(type_condition, runtime_type)
                        }
                        None => true,
                    };
                    if applies {
                        self.collect_fields(
                            runtime_type,
                            &fragment.selection_set,
                            fields,
                            visited_fragments,
                        );
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !self.conditions.is_included(&spread.directives)
                        || visited_fragments.contains(&spread.fragment_name.as_str())
                    {
                        continue;
                    }
                    visited_fragments.push(&spread.fragment_name);
                    let Ok(fragment) = self.operation.fragment(&spread.fragment_name) else {
                        continue;
                    };
                    let TypeCondition::On(type_condition) = &fragment.type_condition;
                    if self.type_applies(type_condition, runtime_type) {
                        self.collect_fields(
                            runtime_type,
                            &fragment.selection_set,
                            fields,
                            visited_fragments,
                        );
                    }
                }
            }
        }
    }

    /// Returns `None` when a non-null field of the object resolved to null.
    fn complete_object(
        &mut self,
        static_type: &str,
        object: &Value,
        selection_sets: &[&'a SelectionSet<'static, String>],
        path: &mut Vec<GraphQLErrorPathSegment>,
    ) -> Option<Value> {
        let runtime_type = if self.schema.is_abstract_type(static_type) {
            object
                .get(TYPENAME_FIELD_NAME)
                .and_then(Value::as_str)
                .unwrap_or(static_type)
                .to_string()
        } else {
            static_type.to_string()
        };

        let mut fields = FieldsByResponseKey::new();
        let mut visited_fragments = Vec::new();
        for selection_set in selection_sets {
            self.collect_fields(&runtime_type, selection_set, &mut fields, &mut visited_fragments);
        }

        let mut entries = Vec::with_capacity(fields.len());
        for (response_key, fields) in fields {
            let field = fields[0];
            if field.name == TYPENAME_FIELD_NAME {
                entries.push((response_key.to_string(), Value::String(runtime_type.clone())));
                continue;
            }

            let schema = self.schema;
            let Some((parent_type, definition)) = schema
                .field(&runtime_type, &field.name)
                .map(|definition| (runtime_type.as_str(), definition))
                .or_else(|| {
                    schema
                        .field(static_type, &field.name)
                        .map(|definition| (static_type, definition))
                })
            else {
                trace!(field = %field.name, parent = %runtime_type, "skipping field unknown to the composed schema");
                continue;
            };

            path.push(GraphQLErrorPathSegment::String(response_key.to_string()));
            let completed = self.complete_value(
                &definition.ty,
                object.get(response_key),
                &fields,
                path,
                (parent_type, &field.name),
            );
            path.pop();

            entries.push((response_key.to_string(), completed?));
        }

        Some(Value::Object(entries))
    }

    /// Returns `None` when a non-null position resolved to null, so that the caller
    /// nulls its own nullable position instead.
    fn complete_value(
        &mut self,
        ty: &TypeRef,
        value: Option<&Value>,
        fields: &[&'a Field<'static, String>],
        path: &mut Vec<GraphQLErrorPathSegment>,
        coordinate: (&str, &str),
    ) -> Option<Value> {
        match ty {
            TypeRef::NonNull(inner) => {
                let completed = self.complete_value(inner, value, fields, path, coordinate)?;
                if completed.is_null() {
                    self.report_null(path, coordinate);
                    return None;
                }
                Some(completed)
            }
            TypeRef::SemanticNonNull(inner) => {
                self.complete_value(inner, value, fields, path, coordinate)
            }
            TypeRef::List(inner) => {
                let Some(Value::Array(items)) = value else {
                    return Some(Value::Null);
                };
                let mut completed_items = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(GraphQLErrorPathSegment::Index(index));
                    let completed = self.complete_value(inner, Some(item), fields, path, coordinate);
                    path.pop();
                    match completed {
                        Some(completed) => completed_items.push(completed),
                        None => return Some(Value::Null),
                    }
                }
                Some(Value::Array(completed_items))
            }
            TypeRef::Named(type_name) => match value {
                None | Some(Value::Null) => Some(Value::Null),
                Some(value) if self.schema.is_leaf_type(type_name) => Some(value.clone()),
                Some(object @ Value::Object(_)) => {
                    let selection_sets = fields
                        .iter()
                        .copied()
                        .map(|field| &field.selection_set)
                        .collect::<Vec<_>>();
                    Some(
                        self.complete_object(type_name, object, &selection_sets, path)
                            .unwrap_or(Value::Null),
                    )
                }
                Some(_) => Some(Value::Null),
            },
        }
    }

    fn report_null(&mut self, path: &[GraphQLErrorPathSegment], coordinate: (&str, &str)) {
        if self.errors.iter().any(|error| error.touches_path(path)) {
            return;
        }
        let mut error = GraphQLError::from(format!(
            "Cannot return null for non-nullable field {}.{}.",
            coordinate.0, coordinate.1
        ))
        .with_path(path.to_vec())
        .with_code(ErrorCode::NonNullViolation.as_ref());
        error.locations = locate_client_field(self.operation, path).map(|location| vec![location]);
        self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use hive_fusion_composition::{compose, SourceSchema};

    use super::*;

    fn schema(sdl: &str) -> ComposedSchema {
        let source = SourceSchema::parse("a", sdl).unwrap();
        compose(&[source]).into_schema().unwrap()
    }

    fn project(schema: &ComposedSchema, query: &str, data: &str) -> (String, Vec<GraphQLError>) {
        let operation = ClientOperation::parse(query, None).unwrap();
        let data = Value::from_slice(data.as_bytes()).unwrap();
        let mut errors = Vec::new();
        let projected = project_by_operation(schema, &operation, &data, &IndexMap::new(), &mut errors);
        (projected.to_json(), errors)
    }

    const SDL: &str = r#"
      type Query { product: Product products: [Product!] node: Node }
      interface Node { id: ID! }
      type Product implements Node { id: ID! name: String! weight: Float }
      type Category implements Node { id: ID! title: String }
    "#;

    #[test]
    fn drops_fields_the_client_did_not_select() {
        let (data, errors) = project(
            &schema(SDL),
            "{ item: product { id name } }",
            r#"{"item":{"id":"1","weight":2.5,"name":"Chair","_fusion_dep_0":"x"}}"#,
        );

        assert_eq!(data, r#"{"item":{"id":"1","name":"Chair"}}"#);
        assert!(errors.is_empty());
    }

    #[test]
    fn resolves_type_conditions_and_typename() {
        let (data, _) = project(
            &schema(SDL),
            "{ node { __typename id ... on Product { name } ... on Category { title } } }",
            r#"{"node":{"__typename":"Category","id":"c1","title":"Chairs"}}"#,
        );

        assert_eq!(
            data,
            r#"{"node":{"__typename":"Category","id":"c1","title":"Chairs"}}"#
        );
    }

    #[test]
    fn bubbles_nulls_to_the_nearest_nullable_position() {
        let (data, errors) = project(
            &schema(SDL),
            "{ product { id name } products { id name } }",
            r#"{"product":{"id":"1","name":null},"products":[{"id":"2","name":"Desk"},{"id":"3"}]}"#,
        );

        assert_eq!(data, r#"{"product":null,"products":null}"#);
        insta::assert_snapshot!(sonic_rs::to_string(&errors).unwrap(), @r#"[{"message":"Cannot return null for non-nullable field Product.name.","locations":[{"line":1,"column":16}],"path":["product","name"],"extensions":{"code":"NON_NULL_VIOLATION"}},{"message":"Cannot return null for non-nullable field Product.name.","locations":[{"line":1,"column":37}],"path":["products",1,"name"],"extensions":{"code":"NON_NULL_VIOLATION"}}]"#);
    }

    #[test]
    fn does_not_repeat_errors_already_reported() {
        let operation = ClientOperation::parse("{ product { id name } }", None).unwrap();
        let data = Value::from_slice(br#"{"product":{"id":"1","name":null}}"#).unwrap();
        let mut errors = vec![GraphQLError::from("name failed")
            .with_path(vec!["product".into(), "name".into()])];

        let projected =
            project_by_operation(&schema(SDL), &operation, &data, &IndexMap::new(), &mut errors);

        assert_eq!(projected.to_json(), r#"{"product":null}"#);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn semantic_non_null_positions_stay_null() {
        let schema = schema(
            r#"
            type Query { product: Product }
            type Product { id: ID! name: String @semanticNonNull }
            "#,
        );
        let (data, errors) = project(
            &schema,
            "{ product { id name } }",
            r#"{"product":{"id":"1","name":null}}"#,
        );

        assert_eq!(data, r#"{"product":{"id":"1","name":null}}"#);
        assert!(errors.is_empty());
    }

    #[test]
    fn applies_skip_and_include() {
        let (data, _) = project(
            &schema(SDL),
            "{ product { id name @skip(if: true) weight @include(if: false) } }",
            r#"{"product":{"id":"1","name":"Chair","weight":1}}"#,
        );

        assert_eq!(data, r#"{"product":{"id":"1"}}"#);
    }
}
