use std::collections::HashSet;

use graphql_parser::schema::{
    parse_schema, Definition, Directive, EnumValue, Field, InputValue, TypeDefinition as AstType,
    TypeExtension,
};
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::coordinate::SchemaCoordinate;
use crate::directives::{
    DeprecatedDirective, DirectiveError, FusionDirective, InaccessibleDirective, IsDirective,
    KeyDirective, RequiresDirective, SemanticNonNullDirective, SourceDirective, TagDirective,
};
use crate::schema::{
    Deprecation, EnumValueDefinition, FieldDefinition, FieldSource, InputValueDefinition,
    MemberDirectives, TypeDefinition, TypeKind,
};
use crate::selection_map::SchemaView;
use crate::type_ref::TypeRef;

#[derive(Debug, thiserror::Error)]
pub enum SourceSchemaError {
    #[error("failed to parse the SDL of source schema \"{schema}\": {message}")]
    Parse { schema: String, message: String },
    #[error("source schema \"{schema}\" defines type \"{type_name}\" more than once")]
    DuplicateType { schema: String, type_name: String },
    #[error("source schema \"{schema}\" extends unknown type \"{type_name}\"")]
    UnknownExtendedType { schema: String, type_name: String },
}

/// A composition directive that could not be read, reported when composition starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveIssue {
    pub coordinate: SchemaCoordinate,
    pub error: DirectiveError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootOperationKind {
    Query,
    Mutation,
    Subscription,
}

impl RootOperationKind {
    pub fn canonical_type_name(&self) -> &'static str {
        match self {
            RootOperationKind::Query => "Query",
            RootOperationKind::Mutation => "Mutation",
            RootOperationKind::Subscription => "Subscription",
        }
    }
}

/// One service's schema as seen by composition.
///
/// Root operation types are renamed to `Query`, `Mutation` and `Subscription` so that they
/// merge with the root types of the other source schemas.
#[derive(Debug, Clone)]
pub struct SourceSchema {
    name: String,
    types: IndexMap<String, TypeDefinition>,
    repeatable_directives: HashSet<String>,
    directive_issues: Vec<DirectiveIssue>,
}

impl SourceSchema {
    #[instrument(level = "trace", skip(sdl))]
    pub fn parse(name: &str, sdl: &str) -> Result<Self, SourceSchemaError> {
        let name = name.to_string();
        let document = parse_schema::<String>(sdl)
            .map_err(|err| SourceSchemaError::Parse {
                schema: name.clone(),
                message: err.to_string(),
            })?
            .into_static();

        let mut ingestion = Ingestion {
            schema_name: &name,
            issues: Vec::new(),
        };
        let mut root_names: Vec<(String, RootOperationKind)> = Vec::new();
        let mut repeatable_directives = HashSet::new();
        let mut types: IndexMap<String, TypeDefinition> = IndexMap::new();
        let mut extensions = Vec::new();

        for definition in &document.definitions {
            match definition {
                Definition::SchemaDefinition(schema_definition) => {
                    let roots = [
                        (&schema_definition.query, RootOperationKind::Query),
                        (&schema_definition.mutation, RootOperationKind::Mutation),
                        (&schema_definition.subscription, RootOperationKind::Subscription),
                    ];
                    for (type_name, kind) in roots {
                        if let Some(type_name) = type_name {
                            root_names.push((type_name.clone(), kind));
                        }
                    }
                }
                Definition::TypeDefinition(type_definition) => {
                    let converted = ingestion.convert_type(type_definition);
                    if types.contains_key(&converted.name) {
                        return Err(SourceSchemaError::DuplicateType {
                            schema: name.clone(),
                            type_name: converted.name,
                        });
                    }
                    types.insert(converted.name.clone(), converted);
                }
                Definition::TypeExtension(extension) => extensions.push(extension),
                Definition::DirectiveDefinition(directive_definition) => {
                    if directive_definition.repeatable {
                        repeatable_directives.insert(directive_definition.name.clone());
                    }
                }
            }
        }

        for extension in extensions {
            ingestion.apply_extension(&mut types, extension)?;
        }

        for (type_name, kind) in root_names {
            let canonical = kind.canonical_type_name();
            if type_name != canonical {
                if let Some(mut definition) = types.shift_remove(&type_name) {
                    debug!(from = %type_name, to = canonical, "renaming root operation type");
                    definition.name = canonical.to_string();
                    types.insert(canonical.to_string(), definition);
                }
            }
        }

        let directive_issues = ingestion.issues;
        Ok(SourceSchema {
            name,
            types,
            repeatable_directives,
            directive_issues,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn is_repeatable_directive(&self, name: &str) -> bool {
        self.repeatable_directives.contains(name)
    }

    pub fn repeatable_directives(&self) -> impl Iterator<Item = &str> {
        self.repeatable_directives.iter().map(String::as_str)
    }

    pub fn directive_issues(&self) -> &[DirectiveIssue] {
        &self.directive_issues
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        self.types.get(type_name)?.field(field_name)
    }
}

impl SchemaView for SourceSchema {
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

struct Ingestion<'a> {
    schema_name: &'a str,
    issues: Vec<DirectiveIssue>,
}

impl Ingestion<'_> {
    fn parse_directive<D: FusionDirective>(
        &mut self,
        directive: &Directive<'static, String>,
        coordinate: &SchemaCoordinate,
    ) -> Option<D> {
        match D::parse(directive) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                self.issues.push(DirectiveIssue {
                    coordinate: coordinate.clone(),
                    error,
                });
                None
            }
        }
    }

    /// Splits member directives into typed payloads. Returns the deprecation state and the
    /// semantic non-null levels alongside, since they shape the member rather than decorate it.
    fn convert_directives(
        &mut self,
        directives: &[Directive<'static, String>],
        coordinate: &SchemaCoordinate,
    ) -> (MemberDirectives, Option<Deprecation>, Option<Vec<usize>>) {
        let mut result = MemberDirectives::default();
        let mut deprecation = None;
        let mut semantic_non_null = None;

        for directive in directives {
            if InaccessibleDirective::is(directive) {
                result.inaccessible = true;
            } else if TagDirective::is(directive) {
                if let Some(tag) = self.parse_directive::<TagDirective>(directive, coordinate) {
                    if !result.tags.contains(&tag) {
                        result.tags.push(tag);
                    }
                }
            } else if KeyDirective::is(directive) {
                if let Some(key) = self.parse_directive::<KeyDirective>(directive, coordinate) {
                    result.keys.push(key);
                }
            } else if SourceDirective::is(directive) {
                if let Some(source) = self.parse_directive::<SourceDirective>(directive, coordinate) {
                    result.sources.push(source);
                }
            } else if RequiresDirective::is(directive) {
                result.requires = self.parse_directive::<RequiresDirective>(directive, coordinate);
            } else if IsDirective::is(directive) {
                result.is = self.parse_directive::<IsDirective>(directive, coordinate);
            } else if DeprecatedDirective::is(directive) {
                deprecation = self
                    .parse_directive::<DeprecatedDirective>(directive, coordinate)
                    .map(|parsed| Deprecation {
                        reason: parsed.reason,
                    });
            } else if SemanticNonNullDirective::is(directive) {
                semantic_non_null = self
                    .parse_directive::<SemanticNonNullDirective>(directive, coordinate)
                    .map(|parsed| parsed.levels);
            } else {
                result.other.push(directive.clone());
            }
        }

        (result, deprecation, semantic_non_null)
    }

    fn convert_type(&mut self, definition: &AstType<'static, String>) -> TypeDefinition {
        match definition {
            AstType::Scalar(scalar) => {
                let mut converted = TypeDefinition::new(&scalar.name, TypeKind::Scalar);
                converted.description = scalar.description.clone();
                converted.directives = self.type_directives(&scalar.name, &scalar.directives);
                converted
            }
            AstType::Object(object) => {
                let mut converted = TypeDefinition::new(&object.name, TypeKind::Object);
                converted.description = object.description.clone();
                converted.interfaces = object.implements_interfaces.clone();
                converted.directives = self.type_directives(&object.name, &object.directives);
                converted.fields = self.convert_fields(&object.name, &object.fields);
                converted
            }
            AstType::Interface(interface) => {
                let mut converted = TypeDefinition::new(&interface.name, TypeKind::Interface);
                converted.description = interface.description.clone();
                converted.interfaces = interface.implements_interfaces.clone();
                converted.directives = self.type_directives(&interface.name, &interface.directives);
                converted.fields = self.convert_fields(&interface.name, &interface.fields);
                converted
            }
            AstType::Union(union) => {
                let mut converted = TypeDefinition::new(&union.name, TypeKind::Union);
                converted.description = union.description.clone();
                converted.union_members = union.types.clone();
                converted.directives = self.type_directives(&union.name, &union.directives);
                converted
            }
            AstType::Enum(enum_type) => {
                let mut converted = TypeDefinition::new(&enum_type.name, TypeKind::Enum);
                converted.description = enum_type.description.clone();
                converted.directives = self.type_directives(&enum_type.name, &enum_type.directives);
                converted.enum_values = self.convert_enum_values(&enum_type.name, &enum_type.values);
                converted
            }
            AstType::InputObject(input) => {
                let mut converted = TypeDefinition::new(&input.name, TypeKind::InputObject);
                converted.description = input.description.clone();
                converted.directives = self.type_directives(&input.name, &input.directives);
                converted.input_fields = input
                    .fields
                    .iter()
                    .map(|field| {
                        let coordinate = SchemaCoordinate::member(&input.name, &field.name);
                        (field.name.clone(), self.convert_input_value(field, &coordinate))
                    })
                    .collect();
                converted
            }
        }
    }

    fn type_directives(
        &mut self,
        type_name: &str,
        directives: &[Directive<'static, String>],
    ) -> MemberDirectives {
        let coordinate = SchemaCoordinate::ty(type_name);
        self.convert_directives(directives, &coordinate).0
    }

    fn convert_fields(
        &mut self,
        type_name: &str,
        fields: &[Field<'static, String>],
    ) -> IndexMap<String, FieldDefinition> {
        fields
            .iter()
            .map(|field| (field.name.clone(), self.convert_field(type_name, field)))
            .collect()
    }

    fn convert_field(&mut self, type_name: &str, field: &Field<'static, String>) -> FieldDefinition {
        let coordinate = SchemaCoordinate::member(type_name, &field.name);
        let (directives, deprecation, semantic_non_null) =
            self.convert_directives(&field.directives, &coordinate);

        let mut ty = TypeRef::from_ast(&field.field_type);
        if let Some(levels) = &semantic_non_null {
            ty = ty.with_semantic_non_null(levels);
        }

        let arguments = field
            .arguments
            .iter()
            .map(|argument| {
                let coordinate = SchemaCoordinate::argument(type_name, &field.name, &argument.name);
                (argument.name.clone(), self.convert_input_value(argument, &coordinate))
            })
            .collect();

        let sources = if directives.sources.is_empty() {
            vec![FieldSource {
                schema: self.schema_name.to_string(),
                original_name: field.name.clone(),
                requires: directives.requires.clone(),
            }]
        } else {
            let mut sources: Vec<FieldSource> = Vec::new();
            for source in &directives.sources {
                if sources.iter().any(|existing| existing.schema == source.schema) {
                    continue;
                }
                sources.push(FieldSource {
                    schema: source.schema.clone(),
                    original_name: source.name.clone().unwrap_or_else(|| field.name.clone()),
                    requires: directives.requires.clone(),
                });
            }
            sources
        };

        FieldDefinition {
            name: field.name.clone(),
            description: field.description.clone(),
            ty,
            arguments,
            deprecation,
            directives,
            sources,
        }
    }

    fn convert_input_value(
        &mut self,
        value: &InputValue<'static, String>,
        coordinate: &SchemaCoordinate,
    ) -> InputValueDefinition {
        let (directives, deprecation, _) = self.convert_directives(&value.directives, coordinate);
        InputValueDefinition {
            name: value.name.clone(),
            description: value.description.clone(),
            ty: TypeRef::from_ast(&value.value_type),
            default_value: value.default_value.clone(),
            deprecation,
            directives,
        }
    }

    fn convert_enum_values(
        &mut self,
        type_name: &str,
        values: &[EnumValue<'static, String>],
    ) -> IndexMap<String, EnumValueDefinition> {
        values
            .iter()
            .map(|value| {
                let coordinate = SchemaCoordinate::member(type_name, &value.name);
                let (directives, deprecation, _) =
                    self.convert_directives(&value.directives, &coordinate);
                (
                    value.name.clone(),
                    EnumValueDefinition {
                        name: value.name.clone(),
                        description: value.description.clone(),
                        deprecation,
                        directives,
                    },
                )
            })
            .collect()
    }

    fn apply_extension(
        &mut self,
        types: &mut IndexMap<String, TypeDefinition>,
        extension: &TypeExtension<'static, String>,
    ) -> Result<(), SourceSchemaError> {
        let (type_name, directives) = match extension {
            TypeExtension::Scalar(ext) => (&ext.name, &ext.directives),
            TypeExtension::Object(ext) => (&ext.name, &ext.directives),
            TypeExtension::Interface(ext) => (&ext.name, &ext.directives),
            TypeExtension::Union(ext) => (&ext.name, &ext.directives),
            TypeExtension::Enum(ext) => (&ext.name, &ext.directives),
            TypeExtension::InputObject(ext) => (&ext.name, &ext.directives),
        };

        let extra_directives = self.type_directives(type_name, directives);
        let fields = match extension {
            TypeExtension::Object(ext) => self.convert_fields(&ext.name, &ext.fields),
            TypeExtension::Interface(ext) => self.convert_fields(&ext.name, &ext.fields),
            _ => IndexMap::new(),
        };
        let enum_values = match extension {
            TypeExtension::Enum(ext) => self.convert_enum_values(&ext.name, &ext.values),
            _ => IndexMap::new(),
        };
        let input_fields: IndexMap<String, InputValueDefinition> = match extension {
            TypeExtension::InputObject(ext) => ext
                .fields
                .iter()
                .map(|field| {
                    let coordinate = SchemaCoordinate::member(&ext.name, &field.name);
                    (field.name.clone(), self.convert_input_value(field, &coordinate))
                })
                .collect(),
            _ => IndexMap::new(),
        };

        let target = types
            .get_mut(type_name)
            .ok_or_else(|| SourceSchemaError::UnknownExtendedType {
                schema: self.schema_name.to_string(),
                type_name: type_name.clone(),
            })?;

        match extension {
            TypeExtension::Object(ext) => target.interfaces.extend(ext.implements_interfaces.clone()),
            TypeExtension::Interface(ext) => {
                target.interfaces.extend(ext.implements_interfaces.clone())
            }
            TypeExtension::Union(ext) => target.union_members.extend(ext.types.clone()),
            _ => {}
        }
        target.fields.extend(fields);
        target.enum_values.extend(enum_values);
        target.input_fields.extend(input_fields);
        target.directives.inaccessible |= extra_directives.inaccessible;
        target.directives.tags.extend(extra_directives.tags);
        target.directives.keys.extend(extra_directives.keys);
        target.directives.other.extend(extra_directives.other);

        Ok(())
    }
}
