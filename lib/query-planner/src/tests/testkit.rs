use std::sync::Once;

use hive_fusion_composition::{compose as compose_sources, ComposedSchema, SourceSchema};
use lazy_static::lazy_static;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::planner::{plan, OperationPlan, SubQuery};
use crate::utils::parsing::parse_operation;

fn init_test_logger_internal() {
    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_bracketed_fields(true)
        .with_deferred_spans(false)
        .with_wraparound(25)
        .with_indent_lines(true)
        .with_timer(tracing_tree::time::Uptime::default())
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_targets(false);

    tracing_subscriber::registry()
        .with(tree_layer)
        .with(EnvFilter::from_default_env())
        .init();
}

lazy_static! {
    static ref TRACING_INIT: Once = Once::new();
}

pub fn init_logger() {
    TRACING_INIT.call_once(|| {
        init_test_logger_internal();
    });
}

/// Composes the given `(name, sdl)` pairs and panics on composition errors.
pub fn compose(sdls: &[(&str, &str)]) -> ComposedSchema {
    let sources = sdls
        .iter()
        .map(|(name, sdl)| SourceSchema::parse(name, sdl).expect("source schema should parse"))
        .collect::<Vec<_>>();
    compose_sources(&sources)
        .into_schema()
        .unwrap_or_else(|diagnostics| panic!("composition failed: {:?}", diagnostics))
}

pub fn plan_query(schema: &ComposedSchema, query: &str) -> OperationPlan {
    plan(schema, query, None).expect("operation should plan")
}

pub fn sub_query<'p>(plan: &'p OperationPlan, source_schema: &str) -> &'p SubQuery {
    plan.sub_queries
        .iter()
        .find(|sub_query| sub_query.source_schema == source_schema)
        .unwrap_or_else(|| panic!("no sub-query for \"{}\" in\n{}", source_schema, plan))
}

/// The expected document in printed form, so tests can be written with any layout.
pub fn printed(document: &str) -> String {
    parse_operation(document)
        .expect("expected document should parse")
        .to_string()
}

pub fn assert_sub_query(plan: &OperationPlan, source_schema: &str, expected: &str) {
    pretty_assertions::assert_eq!(sub_query(plan, source_schema).document_str, printed(expected));
}

pub const CATALOG: &str = r#"
  type Query {
    product(id: ID!): Product
    products: [Product!]!
  }

  type Product @key(fields: "id") {
    id: ID!
    name: String
    weight: Float
  }
"#;

pub const PRICING: &str = r#"
  type Query {
    product(id: ID!): Product
    products: [Product!]!
  }

  type Product @key(fields: "id") {
    id: ID!
    weight: Float
    price: Float @requires(field: "weight")
    currency: String
  }
"#;

pub fn catalog_and_pricing() -> ComposedSchema {
    compose(&[("catalog", CATALOG), ("pricing", PRICING)])
}
