use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::composed_schema::ComposedSchema;
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::schema::{TypeDefinition, TypeKind};
use crate::selection_map::SchemaView;
use crate::source_schema::SourceSchema;

mod directives;
mod field;
mod type_merger;
mod types;

pub use type_merger::{merge_input_type, merge_output_type};

pub(crate) struct MergeEnv<'a> {
    pub source_schema: &'a str,
    pub repeatable: HashSet<&'a str>,
    diagnostics: &'a mut Diagnostics,
}

impl MergeEnv<'_> {
    pub fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = diagnostic.with_source_schema(self.source_schema);
        self.diagnostics.push(diagnostic);
    }
}

/// Merges the source schemas, in order, into a composed schema. Merge conflicts are reported
/// to `diagnostics`; the conflicting contribution is skipped and the composed member keeps
/// the last compatible shape.
#[instrument(level = "trace", skip_all, fields(source_schemas = sources.len()))]
pub(crate) fn merge_source_schemas(
    sources: &[SourceSchema],
    diagnostics: &mut Diagnostics,
) -> ComposedSchema {
    let mut types: IndexMap<String, TypeDefinition> = IndexMap::new();
    let mut source_names: Vec<String> = Vec::new();
    let mut env = MergeEnv {
        source_schema: "",
        repeatable: sources
            .iter()
            .flat_map(|source| source.repeatable_directives())
            .collect(),
        diagnostics,
    };

    for source in sources {
        if source_names.iter().any(|name| name == source.name()) {
            env.source_schema = source.name();
            env.report(Diagnostic::error(
                DiagnosticCode::DuplicateSourceSchemaName,
                format!(
                    "source schema name \"{}\" is used more than once, only the first one is composed",
                    source.name()
                ),
            ));
            continue;
        }
        source_names.push(source.name().to_string());
        env.source_schema = source.name();

        for definition in source.types() {
            match types.get_mut(&definition.name) {
                None => {
                    types.insert(definition.name.clone(), definition.clone());
                }
                Some(existing) if existing.kind != definition.kind => {
                    let message = format!(
                        "\"{}\" is defined as {} in \"{}\" but as {} in an earlier source schema",
                        definition.name,
                        definition.kind,
                        source.name(),
                        existing.kind
                    );
                    env.report(
                        Diagnostic::error(DiagnosticCode::TypeKindMismatch, message)
                            .with_coordinate(SchemaCoordinate::ty(&definition.name)),
                    );
                }
                Some(existing) => types::merge_type(existing, definition, &mut env),
            }
        }
    }

    intersect_input_fields(&mut types, sources);

    ComposedSchema::new(types, source_names)
}

/// Input object fields survive only when every source schema defining the input type
/// defines them.
fn intersect_input_fields(types: &mut IndexMap<String, TypeDefinition>, sources: &[SourceSchema]) {
    for definition in types.values_mut() {
        if definition.kind != TypeKind::InputObject {
            continue;
        }
        let definers: Vec<&TypeDefinition> = sources
            .iter()
            .filter_map(|source| source.type_definition(&definition.name))
            .filter(|source_definition| source_definition.kind == TypeKind::InputObject)
            .collect();

        definition.input_fields.retain(|name, _| {
            let everywhere = definers
                .iter()
                .all(|source_definition| source_definition.input_fields.contains_key(name));
            if !everywhere {
                debug!(input = %definition.name, field = %name, "dropping input field missing from some source schemas");
            }
            everywhere
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(sdls: &[(&str, &str)]) -> (ComposedSchema, Diagnostics) {
        let sources = sdls
            .iter()
            .map(|(name, sdl)| SourceSchema::parse(name, sdl).unwrap())
            .collect::<Vec<_>>();
        let mut diagnostics = Diagnostics::default();
        let schema = merge_source_schemas(&sources, &mut diagnostics);
        (schema, diagnostics)
    }

    #[test]
    fn merging_a_schema_with_itself_is_idempotent() {
        let sdl = r#"
          type Query { product(id: ID!): Product @tag(name: "public") }
          type Product @key(fields: "id") { id: ID! name: String @deprecated(reason: "old") }
          enum Color { RED GREEN }
          input Filter { color: Color = RED }
        "#;
        let (single, _) = merge(&[("a", sdl)]);
        let (twice, diagnostics) = merge(&[("a", sdl), ("b", sdl)]);

        assert!(diagnostics.is_empty());
        let product = twice.type_definition("Product").unwrap();
        assert_eq!(product.directives, single.type_definition("Product").unwrap().directives);
        assert_eq!(
            twice.field("Query", "product").unwrap().ty,
            single.field("Query", "product").unwrap().ty
        );
        assert_eq!(
            twice.type_definition("Filter"),
            single.type_definition("Filter")
        );
    }

    #[test]
    fn records_every_resolving_schema() {
        let (schema, diagnostics) = merge(&[
            ("catalog", "type Query { product: Product } type Product { id: ID! name: String }"),
            ("pricing", "type Query { product: Product } type Product { id: ID! price: Float }"),
        ]);

        assert!(diagnostics.is_empty());
        let sources = &schema.field("Product", "id").unwrap().sources;
        assert_eq!(
            sources.iter().map(|source| source.schema.as_str()).collect::<Vec<_>>(),
            vec!["catalog", "pricing"]
        );
        assert_eq!(schema.field("Product", "price").unwrap().sources[0].schema, "pricing");
    }

    #[test]
    fn reports_unmergeable_field_types() {
        let (schema, diagnostics) = merge(&[
            ("a", "type Query { value: String }"),
            ("b", "type Query { value: [String] }"),
        ]);

        let errors = diagnostics.iter_errors().collect::<Vec<_>>();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::OutputFieldTypesNotMergeable);
        assert_eq!(errors[0].source_schema.as_deref(), Some("b"));
        assert_eq!(schema.field("Query", "value").unwrap().ty.to_string(), "String");
    }

    #[test]
    fn reports_kind_mismatch_and_argument_set_mismatch() {
        let (_, diagnostics) = merge(&[
            ("a", "type Query { search(term: String): String } type Item { id: ID }"),
            ("b", "type Query { search(term: String, limit: Int): String } interface Item { id: ID }"),
        ]);

        let codes = diagnostics.iter().map(|diagnostic| diagnostic.code).collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::FieldArgumentSetsMismatch,
                DiagnosticCode::TypeKindMismatch
            ]
        );
    }

    #[test]
    fn intersects_input_fields() {
        let (schema, _) = merge(&[
            ("a", "type Query { a(f: Filter): Int } input Filter { x: Int y: Int }"),
            ("b", "type Query { a(f: Filter): Int } input Filter { x: Int! }"),
        ]);

        let filter = schema.type_definition("Filter").unwrap();
        assert_eq!(filter.input_fields.keys().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(filter.input_fields["x"].ty.to_string(), "Int!");
    }

    #[test]
    fn reports_conflicting_source_names() {
        let (_, diagnostics) = merge(&[
            ("a", r#"type Query { item: Int @source(schema: "c", name: "one") }"#),
            ("b", r#"type Query { item: Int @source(schema: "c", name: "two") }"#),
        ]);

        assert_eq!(
            diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(),
            vec![DiagnosticCode::SourceNameConflict]
        );
    }
}
