use pretty_assertions::assert_eq;

use crate::diagnostics::DiagnosticCode;
use crate::tests::testkit::{codes, compose_sdls, init_logger};

fn coordinates_of(sdls: &[(&str, &str)], code: DiagnosticCode) -> Vec<Vec<String>> {
    compose_sdls(sdls)
        .diagnostics()
        .with_code(code)
        .map(|diagnostic| {
            diagnostic
                .coordinates
                .iter()
                .map(|coordinate| coordinate.to_string())
                .collect()
        })
        .collect()
}

#[test]
fn query_root_must_expose_fields() {
    init_logger();
    let result = compose_sdls(&[("a", "type Query { a: Int @inaccessible }")]);
    assert_eq!(
        codes(result.diagnostics()),
        vec![DiagnosticCode::NoQueries, DiagnosticCode::EmptyMergedObjectType]
    );

    let result = compose_sdls(&[("a", "type Query @inaccessible { a: Int }")]);
    assert_eq!(
        codes(result.diagnostics()),
        vec![DiagnosticCode::QueryRootTypeInaccessible, DiagnosticCode::NoQueries]
    );
}

#[test]
fn interface_fields_must_be_implemented_by_accessible_fields() {
    init_logger();
    let hidden = r#"
      type Query { user: User }
      interface Node { id: ID! secret: String }
      type User implements Node { id: ID! secret: String @inaccessible }
    "#;
    assert_eq!(
        coordinates_of(&[("a", hidden)], DiagnosticCode::ImplementedByInaccessible),
        vec![vec!["User.secret".to_string(), "Node.secret".to_string()]]
    );

    let missing = r#"
      type Query { user: User }
      interface Node { id: ID! name: String }
      type User implements Node { id: ID! }
    "#;
    let result = compose_sdls(&[("a", missing)]);
    assert_eq!(
        codes(result.diagnostics()),
        vec![DiagnosticCode::InterfaceFieldNotImplemented]
    );
}

#[test]
fn default_values_must_not_leak_inaccessible_enum_values() {
    init_logger();
    let result = compose_sdls(&[(
        "a",
        "type Query { paint(color: Color = BLUE): Int } enum Color { RED BLUE @inaccessible }",
    )]);

    let diagnostics = result.diagnostics();
    assert_eq!(
        codes(diagnostics),
        vec![DiagnosticCode::DefaultValueUsesInaccessible]
    );
    assert_eq!(
        diagnostics.iter().next().unwrap().coordinates[1].to_string(),
        "Color.BLUE"
    );
}

#[test]
fn default_values_must_not_leak_inaccessible_input_fields() {
    init_logger();
    let result = compose_sdls(&[(
        "a",
        "type Query { search(filter: Filter = { term: \"x\", hidden: 1 }): Int } input Filter { term: String hidden: Int @inaccessible }",
    )]);

    assert_eq!(
        codes(result.diagnostics()),
        vec![DiagnosticCode::DefaultValueUsesInaccessible]
    );
}

#[test]
fn accessible_members_must_not_reference_inaccessible_types() {
    init_logger();
    assert_eq!(
        coordinates_of(
            &[("a", "type Query { secret: Secret } type Secret @inaccessible { id: ID }")],
            DiagnosticCode::ReferenceToInaccessibleType
        ),
        vec![vec!["Query.secret".to_string(), "Secret".to_string()]]
    );

    let result = compose_sdls(&[(
        "a",
        "type Query { secret: Secret @inaccessible other: Int } type Secret @inaccessible { id: ID }",
    )]);
    assert!(result.diagnostics().is_empty());
}

#[test]
fn required_input_fields_must_exist_everywhere() {
    init_logger();
    let result = compose_sdls(&[
        (
            "a",
            "type Query { search(filter: Filter): Int } input Filter { term: String! limit: Int }",
        ),
        (
            "b",
            "type Query { search(filter: Filter): Int } input Filter { limit: Int }",
        ),
    ]);

    let diagnostics = result.diagnostics();
    assert_eq!(
        codes(diagnostics),
        vec![DiagnosticCode::RequiredInputFieldMissingInSomeSchema]
    );
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.coordinates[0].to_string(), "Filter.term");
    assert_eq!(diagnostic.source_schema.as_deref(), Some("a"));
}

#[test]
fn required_arguments_must_be_accessible() {
    init_logger();
    assert_eq!(
        coordinates_of(
            &[("a", "type Query { item(id: ID! @inaccessible): Int }")],
            DiagnosticCode::RequiredInputFieldOrArgumentInaccessible
        ),
        vec![vec!["Query.item(id:)".to_string()]]
    );

    let result = compose_sdls(&[("a", "type Query { item(id: ID! = 1 @inaccessible): Int }")]);
    assert!(result.diagnostics().is_empty());
}

#[test]
fn keys_are_resolved_against_the_declaring_schema() {
    init_logger();
    let sdl = |key: &str| {
        format!(
            r#"type Query {{ product: Product }} type Product @key(fields: "{}") {{ id: ID! dimensions: Dimensions }} type Dimensions {{ size: Int }}"#,
            key
        )
    };

    let valid = sdl("id dimensions { size }");
    assert!(compose_sdls(&[("a", valid.as_str())]).diagnostics().is_empty());

    let unknown = sdl("sku");
    assert_eq!(
        coordinates_of(&[("a", unknown.as_str())], DiagnosticCode::KeyInvalidFields),
        vec![vec!["Product".to_string(), "Product.sku".to_string()]]
    );

    let leaf_selection = sdl("id { value }");
    assert_eq!(
        codes(compose_sdls(&[("a", leaf_selection.as_str())]).diagnostics()),
        vec![DiagnosticCode::KeyInvalidFields]
    );

    let missing_selection = sdl("dimensions");
    assert_eq!(
        codes(compose_sdls(&[("a", missing_selection.as_str())]).diagnostics()),
        vec![DiagnosticCode::KeyInvalidFields]
    );

    let broken = sdl("id {");
    assert_eq!(
        codes(compose_sdls(&[("a", broken.as_str())]).diagnostics()),
        vec![DiagnosticCode::KeyInvalidSyntax]
    );
}

#[test]
fn requires_maps_are_resolved_against_the_requiring_schema() {
    init_logger();
    let catalog = "type Query { product: Product } type Product { id: ID! weight: Int }";
    let shipping = |map: &str| {
        format!(
            r#"type Product {{ id: ID! weight: Int shippingCost: Int @requires(field: "{}") }}"#,
            map
        )
    };

    let valid = shipping("weight");
    assert!(compose_sdls(&[("catalog", catalog), ("shipping", valid.as_str())])
        .diagnostics()
        .is_empty());

    let unknown = shipping("dimensions");
    assert_eq!(
        coordinates_of(
            &[("catalog", catalog), ("shipping", unknown.as_str())],
            DiagnosticCode::RequireInvalidFields
        ),
        vec![vec![
            "Product.shippingCost".to_string(),
            "Product.dimensions".to_string()
        ]]
    );

    let broken = shipping("weight.");
    assert_eq!(
        codes(compose_sdls(&[("catalog", catalog), ("shipping", broken.as_str())]).diagnostics()),
        vec![DiagnosticCode::RequireInvalidSyntax]
    );
}

#[test]
fn requires_cannot_reach_fields_only_other_schemas_define() {
    init_logger();
    let catalog = "type Query { product: Product } type Product { id: ID! weight: Int }";
    let shipping = r#"type Product { id: ID! shippingCost: Int @requires(field: "weight") }"#;

    let result = compose_sdls(&[("catalog", catalog), ("shipping", shipping)]);
    let errors = result
        .diagnostics()
        .with_code(DiagnosticCode::RequireInvalidFields)
        .collect::<Vec<_>>();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source_schema.as_deref(), Some("shipping"));
    assert_eq!(
        errors[0]
            .coordinates
            .iter()
            .map(|coordinate| coordinate.to_string())
            .collect::<Vec<_>>(),
        vec!["Product.shippingCost".to_string(), "Product.weight".to_string()]
    );
    assert!(!result.is_success());
}

#[test]
fn is_arguments_must_name_one_matching_value() {
    init_logger();
    let sdl = |directive: &str| {
        format!(
            "type Query {{ productById(id: ID! {}): Product }} type Product {{ id: ID! name: String }}",
            directive
        )
    };
    let codes_for = |directive: &str| codes(compose_sdls(&[("a", sdl(directive).as_str())]).diagnostics());

    assert!(codes_for(r#"@is(field: "id")"#).is_empty());
    assert!(codes_for(r#"@is(coordinate: "Product.id")"#).is_empty());
    assert_eq!(
        codes_for(r#"@is(field: "sku")"#),
        vec![DiagnosticCode::IsInvalidFields]
    );
    assert_eq!(
        codes_for(r#"@is(field: "name")"#),
        vec![DiagnosticCode::IsInvalidFields]
    );
    assert_eq!(
        codes_for(r#"@is(coordinate: "Product.name")"#),
        vec![DiagnosticCode::IsInvalidFields]
    );
    assert_eq!(
        codes_for(r#"@is(field: "id.")"#),
        vec![DiagnosticCode::IsInvalidSyntax]
    );
    assert_eq!(
        codes_for(r#"@is(field: "id", coordinate: "Product.id")"#),
        vec![DiagnosticCode::IsInvalidUsage]
    );
    assert_eq!(codes_for("@is"), vec![DiagnosticCode::IsInvalidUsage]);
}

#[test]
fn input_enums_must_match_across_schemas() {
    init_logger();
    let result = compose_sdls(&[
        ("a", "type Query { paint(color: Color): Int } enum Color { RED BLUE }"),
        ("b", "type Query { paint(color: Color): Int } enum Color { RED }"),
    ]);

    let diagnostics = result.diagnostics();
    assert_eq!(codes(diagnostics), vec![DiagnosticCode::EnumValuesMismatch]);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.coordinates[0].to_string(), "Color.BLUE");
    assert_eq!(diagnostic.source_schema.as_deref(), Some("b"));

    let output_only = compose_sdls(&[
        ("a", "type Query { color: Color } enum Color { RED BLUE }"),
        ("b", "type Query { color: Color } enum Color { RED }"),
    ]);
    assert!(output_only.diagnostics().is_empty());
}
