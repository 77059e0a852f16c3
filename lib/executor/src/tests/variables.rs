use crate::execution::ExecutionRequest;
use crate::executors::map::SourceSchemaExecutorMap;
use crate::response::value::Value;
use crate::tests::testkit::{catalog_and_pricing, execute, init_logger, SourceRecorder};

const QUERY: &str = r#"
  query Product($id: ID!, $withName: Boolean!, $unused: Int) {
    product(id: $id) {
      name @include(if: $withName)
      currency
    }
  }
"#;

fn executors(recorder: &SourceRecorder) -> SourceSchemaExecutorMap {
    SourceSchemaExecutorMap::new()
        .with_executor(
            "catalog",
            recorder.source("catalog", r#"{"data":{"product":{"name":"Chair","id":"1"}}}"#),
        )
        .with_executor(
            "pricing",
            recorder.source("pricing", r#"{"data":{"product":{"currency":"EUR","id":"1"}}}"#),
        )
}

#[tokio::test]
async fn forwards_only_the_variables_each_sub_query_declares() {
    init_logger();
    let schema = catalog_and_pricing();
    let recorder = SourceRecorder::default();
    let request = ExecutionRequest::new(QUERY)
        .with_operation_name("Product")
        .with_variable("id", Value::string("1"))
        .with_variable("withName", Value::Bool(true))
        .with_variable("unused", Value::I64(3));

    let response = execute(&schema, &executors(&recorder), request).await;

    let catalog = &recorder.requests_to("catalog")[0];
    let pricing = &recorder.requests_to("pricing")[0];
    assert_eq!(catalog.variables.to_json(), r#"{"id":"1","withName":true}"#);
    assert_eq!(pricing.variables.to_json(), r#"{"id":"1"}"#);
    assert_eq!(catalog.operation_name.as_deref(), Some("Product"));
    assert_eq!(pricing.operation_name.as_deref(), Some("Product"));
    assert_eq!(
        response.to_json(),
        r#"{"data":{"product":{"name":"Chair","currency":"EUR"}}}"#
    );
}

#[tokio::test]
async fn excluded_fields_are_left_out_of_the_response() {
    init_logger();
    let schema = catalog_and_pricing();
    let recorder = SourceRecorder::default();
    let request = ExecutionRequest::new(QUERY)
        .with_variable("id", Value::string("1"))
        .with_variable("withName", Value::Bool(false));

    let response = execute(&schema, &executors(&recorder), request).await;

    assert_eq!(
        response.to_json(),
        r#"{"data":{"product":{"currency":"EUR"}}}"#
    );
}
