use crate::error::ExtractionError;
use crate::planner::plan;
use crate::tests::testkit::{assert_sub_query, catalog_and_pricing, init_logger, plan_query};

#[test]
fn fully_owned_fragment_stays_a_spread() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(
        &schema,
        r#"
          { product(id: "1") { ...Names } }
          fragment Names on Product { name }
        "#,
    );

    assert_eq!(plan.sub_queries.len(), 1);
    assert_sub_query(
        &plan,
        "catalog",
        r#"
          { product(id: "1") { ...Names } }
          fragment Names on Product { name }
        "#,
    );
}

#[test]
fn split_fragment_is_inlined() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(
        &schema,
        r#"
          { product(id: "1") { ...Details } }
          fragment Details on Product { name currency }
        "#,
    );

    assert_sub_query(
        &plan,
        "catalog",
        r#"{ product(id: "1") { ... on Product { name } id } }"#,
    );
    assert_sub_query(
        &plan,
        "pricing",
        r#"{ product(id: "1") { ... on Product { currency } id } }"#,
    );
}

#[test]
fn fragment_with_injected_requirement_is_kept() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(
        &schema,
        r#"
          { product(id: "1") { ...Price } }
          fragment Price on Product { price }
        "#,
    );

    assert_sub_query(
        &plan,
        "pricing",
        r#"
          { product(id: "1") { ...Price weight } }
          fragment Price on Product { price }
        "#,
    );
}

#[test]
fn nested_spreads_inside_a_split_fragment() {
    init_logger();
    let schema = catalog_and_pricing();
    let plan = plan_query(
        &schema,
        r#"
          { product(id: "1") { ...Outer } }
          fragment Outer on Product { currency ...Inner }
          fragment Inner on Product { name }
        "#,
    );

    assert_sub_query(
        &plan,
        "catalog",
        r#"
          { product(id: "1") { ... on Product { ...Inner } id } }
          fragment Inner on Product { name }
        "#,
    );
    assert_sub_query(
        &plan,
        "pricing",
        r#"{ product(id: "1") { ... on Product { currency } id } }"#,
    );
}

#[test]
fn detects_fragment_cycles() {
    init_logger();
    let schema = catalog_and_pricing();
    let error = plan(
        &schema,
        r#"
          { product(id: "1") { ...A } }
          fragment A on Product { id ...B }
          fragment B on Product { name ...A }
        "#,
        None,
    )
    .unwrap_err();

    assert_eq!(
        error,
        ExtractionError::FragmentCycle {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()]
        }
    );
}

#[test]
fn reports_unknown_fragments() {
    init_logger();
    let schema = catalog_and_pricing();

    assert_eq!(
        plan(&schema, r#"{ product(id: "1") { ...Missing } }"#, None).unwrap_err(),
        ExtractionError::UnknownFragment {
            fragment_name: "Missing".to_string()
        }
    );
}
