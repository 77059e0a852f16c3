use graphql_parser::query::{Field, Selection, SelectionSet};
use hive_fusion_query_planner::ClientOperation;
use strum::AsRefStr;

use crate::executors::error::ExecutorError;
use crate::response::graphql_error::{GraphQLError, GraphQLErrorLocation, GraphQLErrorPathSegment};
use crate::response::value::Value;

/// Values of `extensions.code` set on errors produced while executing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DownstreamServiceError,
    SourceSchemaRequestFailure,
    SourceSchemaTimeout,
    RequestCancelled,
    OperationPlanningFailed,
    NonNullViolation,
}

/// Marks an error reported by a source schema with its origin. A code set by the source
/// schema is kept.
pub fn add_source_schema_info_to_error(error: GraphQLError, source_schema: &str) -> GraphQLError {
    let has_code = error.code().is_some();
    let has_source = error
        .extensions
        .as_ref()
        .and_then(|extensions| extensions.get("sourceSchema"))
        .is_some();

    let mut error = error;
    if !has_code {
        error = error.with_code(ErrorCode::DownstreamServiceError.as_ref());
    }
    if !has_source {
        error = error.with_extension("sourceSchema", Value::string(source_schema));
    }
    error
}

/// Rewrites errors returned by a source schema into the client's coordinate space. Paths
/// already use the client's response keys. Locations point into the sub-query document,
/// so they are replaced by the position of the client field the path leads to, or dropped.
pub fn normalize_source_schema_errors(
    errors: Vec<GraphQLError>,
    source_schema: &str,
    operation: &ClientOperation,
) -> Vec<GraphQLError> {
    errors
        .into_iter()
        .map(|mut error| {
            error.locations = error
                .path
                .as_deref()
                .and_then(|path| locate_client_field(operation, path))
                .map(|location| vec![location]);
            add_source_schema_info_to_error(error, source_schema)
        })
        .collect()
}

/// One error per root field the failed sub-query was responsible for.
pub fn request_failure_errors(
    failure: &ExecutorError,
    source_schema: &str,
    root_response_keys: &[String],
    operation: &ClientOperation,
) -> Vec<GraphQLError> {
    let code = match failure {
        ExecutorError::Timeout(_) => ErrorCode::SourceSchemaTimeout,
        _ => ErrorCode::SourceSchemaRequestFailure,
    };
    let message = format!(
        "Failed to execute request to source schema \"{}\": {}",
        source_schema, failure
    );

    root_response_keys
        .iter()
        .map(|response_key| {
            let path = vec![GraphQLErrorPathSegment::String(response_key.clone())];
            let mut error = GraphQLError::from(message.clone());
            error.locations = locate_client_field(operation, &path).map(|location| vec![location]);
            error
                .with_path(path)
                .with_code(code.as_ref())
                .with_extension("sourceSchema", Value::string(source_schema))
        })
        .collect()
}

/// Follows `path` through the client operation and returns the position of the deepest
/// field it reaches.
pub fn locate_client_field(
    operation: &ClientOperation,
    path: &[GraphQLErrorPathSegment],
) -> Option<GraphQLErrorLocation> {
    let mut selection_set = &operation.selection_set;
    let mut found = None;

    for segment in path {
        let GraphQLErrorPathSegment::String(response_key) = segment else {
            continue;
        };
        match find_field(operation, selection_set, response_key, &mut Vec::new()) {
            Some(field) => {
                found = Some(GraphQLErrorLocation {
                    line: field.position.line,
                    column: field.position.column,
                });
                selection_set = &field.selection_set;
            }
            None => break,
        }
    }

    found
}

fn find_field<'o>(
    operation: &'o ClientOperation,
    selection_set: &'o SelectionSet<'static, String>,
    response_key: &str,
    visited: &mut Vec<&'o str>,
) -> Option<&'o Field<'static, String>> {
    for selection in &selection_set.items {
        let found = match selection {
            Selection::Field(field) => {
                let key = field.alias.as_deref().unwrap_or(&field.name);
                (key == response_key).then_some(field)
            }
            Selection::InlineFragment(fragment) => {
                find_field(operation, &fragment.selection_set, response_key, visited)
            }
            Selection::FragmentSpread(spread) => {
                if visited.contains(&spread.fragment_name.as_str()) {
                    None
                } else {
                    visited.push(&spread.fragment_name);
                    operation
                        .fragment(&spread.fragment_name)
                        .ok()
                        .and_then(|fragment| {
                            find_field(operation, &fragment.selection_set, response_key, visited)
                        })
                }
            }
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn segment(key: &str) -> GraphQLErrorPathSegment {
        GraphQLErrorPathSegment::from(key)
    }

    fn operation() -> ClientOperation {
        ClientOperation::parse(
            r#"query Q {
  item: product(id: "1") {
    ...Pricing
  }
}

fragment Pricing on Product {
  id
  cost: price
}"#,
            None,
        )
        .unwrap()
    }

    #[test]
    fn locates_fields_through_aliases_and_fragments() {
        let path = vec![segment("item"), segment("cost")];
        assert_eq!(
            locate_client_field(&operation(), &path),
            Some(GraphQLErrorLocation { line: 9, column: 3 })
        );
        assert_eq!(
            locate_client_field(&operation(), &[segment("item"), segment("unknown")]),
            Some(GraphQLErrorLocation { line: 2, column: 3 })
        );
    }

    #[test]
    fn source_errors_get_origin_and_client_locations() {
        let error: GraphQLError = sonic_rs::from_str(
            r#"{"message":"no price","locations":[{"line":1,"column":40}],"path":["item","cost"]}"#,
        )
        .unwrap();
        let errors = normalize_source_schema_errors(vec![error], "pricing", &operation());

        insta::assert_snapshot!(sonic_rs::to_string(&errors).unwrap(), @r#"[{"message":"no price","locations":[{"line":9,"column":3}],"path":["item","cost"],"extensions":{"code":"DOWNSTREAM_SERVICE_ERROR","sourceSchema":"pricing"}}]"#);
    }

    #[test]
    fn keeps_codes_set_by_source_schemas() {
        let error = GraphQLError::from("forbidden").with_code("FORBIDDEN");
        let error = add_source_schema_info_to_error(error, "pricing");
        assert_eq!(error.code(), Some("FORBIDDEN"));
    }

    #[test]
    fn transport_failures_become_one_error_per_root_field() {
        let errors = request_failure_errors(
            &ExecutorError::Timeout(Duration::from_secs(2)),
            "pricing",
            &["item".to_string()],
            &operation(),
        );

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), Some("SOURCE_SCHEMA_TIMEOUT"));
        assert_eq!(errors[0].path, Some(vec![segment("item")]));
        assert_eq!(
            errors[0].locations,
            Some(vec![GraphQLErrorLocation { line: 2, column: 3 }])
        );
    }
}
