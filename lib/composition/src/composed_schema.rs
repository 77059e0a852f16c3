use indexmap::IndexMap;

use crate::render::{render_sdl, SdlAudience};
use crate::schema::{FieldDefinition, TypeDefinition, TypeKind};
use crate::selection_map::SchemaView;
use crate::source_schema::RootOperationKind;

/// The single schema exposed to clients, with per-field provenance back to the source
/// schemas that resolve each field.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedSchema {
    types: IndexMap<String, TypeDefinition>,
    source_schemas: Vec<String>,
}

impl ComposedSchema {
    pub(crate) fn new(types: IndexMap<String, TypeDefinition>, source_schemas: Vec<String>) -> Self {
        ComposedSchema {
            types,
            source_schemas,
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        self.types.get(type_name)?.field(field_name)
    }

    /// Names of the source schemas, in composition order.
    pub fn source_schemas(&self) -> &[String] {
        &self.source_schemas
    }

    pub fn source_schema_index(&self, name: &str) -> Option<usize> {
        self.source_schemas.iter().position(|candidate| candidate == name)
    }

    pub fn has_source_schema(&self, name: &str) -> bool {
        self.source_schema_index(name).is_some()
    }

    pub fn root_type(&self, kind: RootOperationKind) -> Option<&TypeDefinition> {
        self.types.get(kind.canonical_type_name())
    }

    pub fn query_type(&self) -> Option<&TypeDefinition> {
        self.root_type(RootOperationKind::Query)
    }

    pub fn is_abstract_type(&self, name: &str) -> bool {
        self.types
            .get(name)
            .is_some_and(|definition| definition.kind.is_abstract())
    }

    pub fn is_object_type(&self, name: &str) -> bool {
        self.types
            .get(name)
            .is_some_and(|definition| definition.kind == TypeKind::Object)
    }

    /// Whether the named type is defined by a source schema, judged by the fields it resolves.
    /// Types without fields (scalars, enums, unions) count as known everywhere.
    pub fn is_type_known_to(&self, type_name: &str, schema: &str) -> bool {
        match self.types.get(type_name) {
            Some(definition) if definition.kind.is_composite() && !definition.fields.is_empty() => {
                definition
                    .fields
                    .values()
                    .any(|field| field.is_resolved_by(schema))
            }
            _ => true,
        }
    }

    /// The composed SDL, including composition directives and inaccessible members.
    pub fn to_sdl(&self) -> String {
        render_sdl(self, SdlAudience::Composed)
    }

    /// The client-facing SDL: inaccessible members removed, composition directives stripped.
    pub fn to_client_sdl(&self) -> String {
        render_sdl(self, SdlAudience::Client)
    }
}

impl SchemaView for ComposedSchema {
    fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    fn possible_types(&self, abstract_type: &str) -> Vec<&str> {
        match self.types.get(abstract_type) {
            Some(definition) if definition.kind == TypeKind::Union => {
                definition.union_members.iter().map(String::as_str).collect()
            }
            Some(definition) if definition.kind == TypeKind::Interface => self
                .types
                .values()
                .filter(|candidate| {
                    candidate.kind == TypeKind::Object
                        && candidate.interfaces.iter().any(|name| name == abstract_type)
                })
                .map(|candidate| candidate.name.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}
