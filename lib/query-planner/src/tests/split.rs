use hive_fusion_composition::SchemaCoordinate;

use crate::error::ExtractionError;
use crate::planner::{plan, EntityKeyHint};
use crate::tests::testkit::{
    assert_sub_query, catalog_and_pricing, compose, init_logger, plan_query, printed,
};

const CATALOG_PLAIN: &str = r#"
  type Query { product(id: ID!): Product }
  type Product { id: ID! name: String }
"#;

const PRICING_PLAIN: &str = r#"
  type Query { product(id: ID!): Product }
  type Product { id: ID! price: Float }
"#;

#[test]
fn splits_fields_by_owning_schema() {
    init_logger();
    let schema = compose(&[("catalog", CATALOG_PLAIN), ("pricing", PRICING_PLAIN)]);
    let plan = plan_query(&schema, r#"{ product(id: "1") { id price } }"#);

    assert_eq!(plan.sub_queries.len(), 2);
    assert_sub_query(&plan, "catalog", r#"{ product(id: "1") { id } }"#);
    assert_sub_query(&plan, "pricing", r#"{ product(id: "1") { price } }"#);
    assert!(plan.entity_keys.is_empty());
    assert!(plan.sub_queries.iter().all(|sub_query| sub_query.group == 0));
}

#[test]
fn prints_the_plan() {
    init_logger();
    let schema = compose(&[("catalog", CATALOG_PLAIN), ("pricing", PRICING_PLAIN)]);
    let plan = plan_query(&schema, r#"{ product(id: "1") { id price } }"#);

    insta::assert_snapshot!(format!("{}", plan), @r###"
    OperationPlan(kind: query) {
      SubQuery(id: 0, schema: "catalog", group: 0) {
        {
          product(id: "1") {
            id
          }
        }
      },
      SubQuery(id: 1, schema: "pricing", group: 0) {
        {
          product(id: "1") {
            price
          }
        }
      },
    },
    "###);
}

#[test]
fn leaves_follow_the_schema_already_in_use() {
    init_logger();
    let schema = compose(&[("catalog", CATALOG_PLAIN), ("pricing", PRICING_PLAIN)]);
    let plan = plan_query(&schema, r#"{ product(id: "1") { price id } }"#);

    assert_eq!(plan.sub_queries.len(), 1);
    assert_sub_query(&plan, "pricing", r#"{ product(id: "1") { price id } }"#);
}

#[test]
fn injects_entity_keys_into_split_entities() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(&schema, r#"{ products { name price } }"#);

    assert_sub_query(&plan, "catalog", r#"{ products { name id } }"#);
    assert_sub_query(&plan, "pricing", r#"{ products { price id weight } }"#);
    assert_eq!(
        plan.entity_keys,
        vec![EntityKeyHint {
            path: vec!["products".to_string()],
            type_name: "Product".to_string(),
            key_fields: vec!["id".to_string()],
        }]
    );
}

#[test]
fn entity_key_is_aliased_when_the_client_uses_its_response_key() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(&schema, r#"{ product(id: "1") { id: name currency } }"#);

    assert_sub_query(
        &plan,
        "catalog",
        r#"{ product(id: "1") { id: name _fusion_dep_0: id } }"#,
    );
    assert_sub_query(
        &plan,
        "pricing",
        r#"{ product(id: "1") { currency _fusion_dep_0: id } }"#,
    );
    assert_eq!(plan.entity_keys[0].key_fields, vec!["_fusion_dep_0".to_string()]);
}

#[test]
fn renamed_fields_are_aliased_to_the_client_key() {
    init_logger();
    let schema = compose(&[(
        "catalog",
        r#"
          type Query { product(id: ID!): Product }
          type Product { id: ID! title: String @source(schema: "catalog", name: "name") }
        "#,
    )]);
    let plan = plan_query(&schema, r#"{ product(id: "1") { title label: title } }"#);

    assert_sub_query(
        &plan,
        "catalog",
        r#"{ product(id: "1") { title: name label: name } }"#,
    );
}

#[test]
fn keeps_executable_directives() {
    init_logger();
    let schema = compose(&[("catalog", CATALOG_PLAIN)]);
    let plan = plan(
        &schema,
        r#"query ($skip: Boolean!) { product(id: "1") { name @skip(if: $skip) } }"#,
        None,
    )
    .unwrap();

    assert_sub_query(
        &plan,
        "catalog",
        r#"query ($skip: Boolean!) { product(id: "1") { name @skip(if: $skip) } }"#,
    );
}

#[test]
fn single_schema_operations_are_unchanged() {
    init_logger();
    let schema = compose(&[(
        "catalog",
        r#"
          type Query { product(id: ID!): Product }
          type Product { id: ID! name: String related: [Product!]! }
        "#,
    )]);
    let operation = r#"
      query Named($id: ID!) {
        product(id: $id) {
          id
          ...Info
          related { id alias: name }
        }
      }

      fragment Info on Product { name }
    "#;
    let plan = plan(&schema, operation, None).unwrap();

    assert_eq!(plan.sub_queries.len(), 1);
    assert_eq!(plan.sub_queries[0].document_str, printed(operation));
}

#[test]
fn reports_unknown_and_unresolvable_fields() {
    init_logger();
    let schema = catalog_and_pricing();

    assert_eq!(
        plan(&schema, r#"{ product(id: "1") { nope } }"#, None).unwrap_err(),
        ExtractionError::UnknownField {
            coordinate: SchemaCoordinate::member("Product", "nope"),
            path: "product.nope".to_string(),
        }
    );
    assert_eq!(
        plan(&schema, "subscription { product { id } }", None).unwrap_err(),
        ExtractionError::UnsupportedOperationKind {
            kind: "subscription"
        }
    );
    assert_eq!(
        plan(&schema, "mutation { product { id } }", None).unwrap_err(),
        ExtractionError::RootTypeNotFound { kind: "mutation" }
    );
}

#[test]
fn inaccessible_fields_cannot_be_queried() {
    init_logger();
    let schema = compose(&[(
        "catalog",
        "type Query { product: Product } type Product { id: ID! secret: String @inaccessible }",
    )]);

    assert!(matches!(
        plan(&schema, "{ product { secret } }", None),
        Err(ExtractionError::UnknownField { .. })
    ));
}
