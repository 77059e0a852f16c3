use pretty_assertions::assert_eq;

use crate::selection_map::{parse_selection_map, validate_selection_map, SelectionMapError};
use crate::tests::testkit::{init_logger, source};
use crate::type_ref::TypeRef;

const SCHEMA: &str = r#"
  type Query { a: A }
  type A { b: B tags: [String] }
  type B { c: String }

  type Book { isbn: String! author: Author }
  type Movie { imdb: String! }
  type Author { id: ID! name: String }
  union Media = Book | Movie

  input AuthorInput { id: ID! name: String }
"#;

#[test]
fn nested_path_resolves_without_errors() {
    init_logger();
    let schema = source("a", SCHEMA);
    let map = parse_selection_map("a.b.c").unwrap();

    let validation = validate_selection_map(&map, Some(&TypeRef::named("String")), "Query", &schema);

    assert!(validation.is_valid(), "{:?}", validation.errors);
    assert_eq!(
        validation
            .selected_fields
            .iter()
            .map(|coordinate| coordinate.to_string())
            .collect::<Vec<_>>(),
        vec!["Query.a", "A.b", "B.c"]
    );
}

#[test]
fn unknown_field_is_reported_once() {
    init_logger();
    let schema = source("a", SCHEMA);
    let map = parse_selection_map("a.x").unwrap();

    let validation = validate_selection_map(&map, Some(&TypeRef::named("String")), "Query", &schema);

    assert_eq!(validation.errors.len(), 1);
    match &validation.errors[0] {
        SelectionMapError::UnresolvedField { path, coordinate } => {
            assert_eq!(path, "a.x");
            assert_eq!(coordinate.to_string(), "A.x");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn type_conditions_select_from_union_members() {
    init_logger();
    let schema = source("a", SCHEMA);

    let map = parse_selection_map("<Book>.isbn | <Movie>.imdb").unwrap();
    let validation = validate_selection_map(&map, Some(&TypeRef::named("String")), "Media", &schema);
    assert!(validation.is_valid(), "{:?}", validation.errors);

    let map = parse_selection_map("<Author>.name").unwrap();
    let validation = validate_selection_map(&map, None, "Media", &schema);
    assert!(matches!(
        validation.errors.as_slice(),
        [SelectionMapError::InvalidTypeCondition { .. }]
    ));
}

#[test]
fn object_selection_must_fit_input_object() {
    init_logger();
    let schema = source("a", SCHEMA);
    let input = TypeRef::named("AuthorInput");

    let map = parse_selection_map("author.{ id name }").unwrap();
    let validation = validate_selection_map(&map, Some(&input), "Book", &schema);
    assert!(validation.is_valid(), "{:?}", validation.errors);

    let map = parse_selection_map("author.{ name }").unwrap();
    let validation = validate_selection_map(&map, Some(&input), "Book", &schema);
    assert!(matches!(
        validation.errors.as_slice(),
        [SelectionMapError::MissingRequiredInputField { .. }]
    ));

    let map = parse_selection_map("author").unwrap();
    let validation = validate_selection_map(&map, Some(&input), "Book", &schema);
    assert!(validation.is_valid(), "{:?}", validation.errors);
}

#[test]
fn shape_mismatches_are_reported() {
    init_logger();
    let schema = source("a", SCHEMA);

    let map = parse_selection_map("a.tags").unwrap();
    let validation = validate_selection_map(&map, Some(&TypeRef::named("String")), "Query", &schema);
    assert!(matches!(
        validation.errors.as_slice(),
        [SelectionMapError::ListMismatch { .. }]
    ));

    let map = parse_selection_map("a.tags[c]").unwrap();
    let validation = validate_selection_map(&map, None, "Query", &schema);
    assert!(matches!(
        validation.errors.as_slice(),
        [SelectionMapError::LeafRequiresNoSelection { .. }]
    ));

    let map = parse_selection_map("a.b").unwrap();
    let validation = validate_selection_map(&map, None, "Query", &schema);
    assert!(matches!(
        validation.errors.as_slice(),
        [SelectionMapError::SelectionRequired { .. }]
    ));

    let map = parse_selection_map("a.b.c").unwrap();
    let validation = validate_selection_map(&map, Some(&TypeRef::named("Int")), "Query", &schema);
    assert!(matches!(
        validation.errors.as_slice(),
        [SelectionMapError::TypeMismatch { .. }]
    ));
}
