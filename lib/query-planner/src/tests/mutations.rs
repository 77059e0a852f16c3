use crate::operation::OperationKind;
use crate::planner::plan;
use crate::tests::testkit::{assert_sub_query, compose, init_logger};

fn schema() -> hive_fusion_composition::ComposedSchema {
    compose(&[
        (
            "catalog",
            r#"
              type Query { product(id: ID!): Product }
              type Mutation { addProduct(name: String!): Product }
              type Product { id: ID! name: String }
            "#,
        ),
        (
            "pricing",
            r#"
              type Query { product(id: ID!): Product }
              type Mutation {
                setPrice(id: ID!, price: Float!): Product
                addProduct(name: String!): Product
              }
              type Product { id: ID! price: Float }
            "#,
        ),
    ])
}

#[test]
fn root_fields_run_one_after_another() {
    init_logger();
    let schema = schema();
    let plan = plan(
        &schema,
        r#"
          mutation {
            addProduct(name: "chair") { id name }
            setPrice(id: "1", price: 2.5) { id price }
          }
        "#,
        None,
    )
    .unwrap();

    assert_eq!(plan.kind, OperationKind::Mutation);
    assert_eq!(
        plan.sub_queries
            .iter()
            .map(|sub_query| (sub_query.source_schema.as_str(), sub_query.group))
            .collect::<Vec<_>>(),
        vec![("catalog", 0), ("pricing", 1)]
    );
    assert_eq!(plan.groups().into_iter().collect::<Vec<_>>(), vec![0, 1]);
    assert_sub_query(&plan, "catalog", r#"mutation { addProduct(name: "chair") { id name } }"#);
    assert_sub_query(
        &plan,
        "pricing",
        r#"mutation { setPrice(id: "1", price: 2.5) { id price } }"#,
    );
}

#[test]
fn mutation_field_is_pinned_to_its_first_resolver() {
    init_logger();
    let schema = schema();

    let error = plan(
        &schema,
        r#"mutation { addProduct(name: "chair") { price } }"#,
        None,
    )
    .unwrap_err();

    assert_eq!(
        error.to_string(),
        "Field 'Product.price' at 'addProduct.price' cannot be resolved by any source schema in reach."
    );
}
