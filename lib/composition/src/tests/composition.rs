use std::error::Error;

use pretty_assertions::assert_eq;

use crate::diagnostics::{DiagnosticCode, Severity};
use crate::selection_map::SchemaView;
use crate::tests::testkit::{codes, compose_sdls, init_logger};

const CATALOG: &str = r#"
  type Query {
    product(id: ID!): Product
  }

  type Product @key(fields: "id") {
    id: ID!
    name: String
    internalCode: String @inaccessible
  }
"#;

const PRICING: &str = r#"
  type Query {
    product(id: ID!): Product
  }

  type Product @key(fields: "id") {
    id: ID!
    price: Float!
  }
"#;

#[test]
fn composes_client_schema() -> Result<(), Box<dyn Error>> {
    init_logger();
    let result = compose_sdls(&[("catalog", CATALOG), ("pricing", PRICING)]);
    assert!(result.diagnostics().is_empty(), "{}", result.diagnostics());

    let schema = result.into_schema().map_err(|diagnostics| diagnostics.to_string())?;
    insta::assert_snapshot!(schema.to_client_sdl(), @r"
    schema {
      query: Query
    }

    type Query {
      product(id: ID!): Product
    }

    type Product {
      id: ID!
      name: String
      price: Float!
    }
    ");

    Ok(())
}

#[test]
fn composed_sdl_keeps_provenance() {
    init_logger();
    let result = compose_sdls(&[("catalog", CATALOG), ("pricing", PRICING)]);
    let sdl = result.schema().to_sdl();

    assert!(sdl.starts_with("directive @source(schema: String!, name: String) repeatable"));
    assert!(sdl.contains("type Product @key(fields: \"id\") {"));
    assert!(sdl.contains("  id: ID! @source(schema: \"catalog\") @source(schema: \"pricing\")\n"));
    assert!(sdl.contains("  internalCode: String @source(schema: \"catalog\") @inaccessible\n"));
    assert!(sdl.contains("  price: Float! @source(schema: \"pricing\")\n"));
}

#[test]
fn merges_fields_declared_with_source_directives() {
    init_logger();
    let sdl = r#"
      type Query { product(id: ID!): Product }
      type Product {
        id: ID @source(schema: "catalog")
        price: Float @source(schema: "pricing")
      }
    "#;
    let result = compose_sdls(&[("catalog", sdl), ("pricing", sdl)]);

    assert!(result.is_success());
    assert!(result.diagnostics().is_empty());
    let product = result.schema().type_definition("Product").unwrap();
    assert_eq!(product.fields.keys().collect::<Vec<_>>(), vec!["id", "price"]);
    assert_eq!(
        product.fields["id"]
            .sources
            .iter()
            .map(|source| source.schema.as_str())
            .collect::<Vec<_>>(),
        vec!["catalog"]
    );
    assert_eq!(product.fields["price"].sources[0].schema, "pricing");
}

#[test]
fn renamed_fields_keep_original_name() {
    init_logger();
    let result = compose_sdls(&[(
        "catalog",
        r#"type Query { productName: String @source(schema: "catalog", name: "name") }"#,
    )]);

    let field = result.schema().field("Query", "productName").unwrap();
    assert_eq!(field.sources[0].original_name, "name");
    assert!(result
        .schema()
        .to_sdl()
        .contains("productName: String @source(schema: \"catalog\", name: \"name\")"));
}

#[test]
fn empty_merged_type_is_reported_once() {
    init_logger();
    let result = compose_sdls(&[
        ("a", "type Query { a: Int } type Secret { x: Int @inaccessible }"),
        ("b", "type Secret { y: Int @inaccessible }"),
    ]);

    assert_eq!(
        codes(result.diagnostics()),
        vec![DiagnosticCode::EmptyMergedObjectType]
    );
    assert!(!result.is_success());
    assert!(result.into_schema().is_err());
}

#[test]
fn malformed_composition_directive_is_a_diagnostic() {
    init_logger();
    let result = compose_sdls(&[("a", "type Query { a: Int @tag }")]);

    let diagnostics = result.diagnostics();
    assert_eq!(codes(diagnostics), vec![DiagnosticCode::InvalidDirective]);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.coordinates[0].to_string(), "Query.a");
    assert_eq!(diagnostic.source_schema.as_deref(), Some("a"));
}

#[test]
fn warnings_do_not_block_the_schema() {
    init_logger();
    let result = compose_sdls(&[("a", r#"type Query { a: Int @source(schema: "ghost") }"#)]);

    assert_eq!(
        codes(result.diagnostics()),
        vec![DiagnosticCode::SourceSchemaNotFound]
    );
    assert_eq!(
        result.diagnostics().iter().next().unwrap().severity,
        Severity::Warning
    );
    assert!(result.is_success());
    assert!(result.into_schema().is_ok());
}

#[test]
fn root_types_are_merged_under_canonical_names() {
    init_logger();
    let result = compose_sdls(&[
        ("a", "schema { query: RootQuery } type RootQuery { a: Int }"),
        ("b", "type Query { b: Int }"),
    ]);

    assert!(result.diagnostics().is_empty());
    let query = result.schema().query_type().unwrap();
    assert_eq!(query.fields.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert!(result.schema().type_definition("RootQuery").is_none());
}
