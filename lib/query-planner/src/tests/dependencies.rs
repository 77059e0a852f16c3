use hive_fusion_composition::{compose as compose_sources, DiagnosticCode, SourceSchema};

use crate::extraction::dependencies::InjectedDependency;
use crate::tests::testkit::{assert_sub_query, catalog_and_pricing, compose, init_logger, plan_query, sub_query};

#[test]
fn requires_injects_fields_the_client_did_not_select() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(&schema, r#"{ product(id: "1") { id price } }"#);

    assert_sub_query(&plan, "catalog", r#"{ product(id: "1") { id } }"#);
    assert_sub_query(&plan, "pricing", r#"{ product(id: "1") { price id weight } }"#);
    assert_eq!(
        sub_query(&plan, "pricing").dependencies,
        vec![
            InjectedDependency {
                path: vec!["product".to_string(), "id".to_string()],
                type_name: "Product".to_string(),
                field_name: "id".to_string(),
            },
            InjectedDependency {
                path: vec!["product".to_string(), "weight".to_string()],
                type_name: "Product".to_string(),
                field_name: "weight".to_string(),
            },
        ]
    );
}

#[test]
fn requirement_already_selected_is_not_duplicated() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(&schema, r#"{ product(id: "1") { currency weight price } }"#);

    assert_eq!(plan.sub_queries.len(), 1);
    assert_sub_query(
        &plan,
        "pricing",
        r#"{ product(id: "1") { currency weight price } }"#,
    );
    assert!(sub_query(&plan, "pricing").dependencies.is_empty());
}

#[test]
fn requirement_colliding_with_a_client_alias_is_renamed() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(&schema, r#"{ product(id: "1") { weight: currency price } }"#);

    assert_sub_query(
        &plan,
        "pricing",
        r#"{ product(id: "1") { weight: currency price _fusion_dep_0: weight } }"#,
    );
}

#[test]
fn requirements_of_other_types_land_in_inline_fragments() {
    init_logger();
    let schema = compose(&[
        (
            "catalog",
            r#"
              type Query { node(id: ID!): Node }
              interface Node { id: ID! }
              type Product implements Node { id: ID! weight: Float }
            "#,
        ),
        (
            "pricing",
            r#"
              type Query { node(id: ID!): Node }
              interface Node { id: ID! }
              type Product implements Node {
                id: ID!
                weight: Float
                price: Float @requires(field: "weight")
              }
            "#,
        ),
    ]);
    let plan = plan_query(&schema, r#"{ node(id: "1") { ... on Product { price } } }"#);

    assert_eq!(plan.sub_queries.len(), 1);
    assert_sub_query(
        &plan,
        "pricing",
        r#"{ node(id: "1") { ... on Product { price } ... on Product { weight } __typename } }"#,
    );
}

#[test]
fn nested_requirements_are_merged_into_client_selections() {
    init_logger();
    let schema = compose(&[
        (
            "catalog",
            r#"
              type Query { product: Product }
              type Product { id: ID! dimensions: Dimensions }
              type Dimensions { width: Int height: Int }
            "#,
        ),
        (
            "shipping",
            r#"
              type Query { product: Product }
              type Product {
                id: ID!
                dimensions: Dimensions
                cost: Float @requires(field: "dimensions.{ width height }")
              }
              type Dimensions { width: Int height: Int }
            "#,
        ),
    ]);
    let plan = plan_query(&schema, "{ product { cost dimensions { width } } }");

    assert_eq!(plan.sub_queries.len(), 1);
    assert_sub_query(
        &plan,
        "shipping",
        "{ product { cost dimensions { width height } } }",
    );
    assert_eq!(
        sub_query(&plan, "shipping").dependencies[0].path,
        vec!["product", "dimensions", "height"]
    );
}

#[test]
fn requirements_only_other_schemas_resolve_never_reach_a_sub_query() {
    init_logger();
    let sources = [
        SourceSchema::parse(
            "catalog",
            r#"
              type Query { product(id: ID!): Product }
              type Product @key(fields: "id") { id: ID! weight: Float }
            "#,
        )
        .unwrap(),
        SourceSchema::parse(
            "pricing",
            r#"
              type Query { product(id: ID!): Product }
              type Product @key(fields: "id") { id: ID! price: Float @requires(field: "weight") }
            "#,
        )
        .unwrap(),
    ];

    let result = compose_sources(&sources);

    assert!(!result.is_success());
    assert_eq!(
        result
            .diagnostics()
            .iter_errors()
            .map(|diagnostic| (diagnostic.code, diagnostic.source_schema.as_deref()))
            .collect::<Vec<_>>(),
        vec![(DiagnosticCode::RequireInvalidFields, Some("pricing"))]
    );
    assert!(result.into_schema().is_err());
}
