use std::fmt::{self, Display};

use graphql_parser::query::Value;
use graphql_parser::schema::Directive;
use indexmap::IndexMap;

use crate::directives::{IsDirective, KeyDirective, RequiresDirective, SourceDirective, TagDirective};
use crate::type_ref::TypeRef;

pub type ConstValue = Value<'static, String>;
pub type OpaqueDirective = Directive<'static, String>;

pub const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

pub fn is_built_in_scalar(name: &str) -> bool {
    BUILT_IN_SCALARS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    pub fn is_composite(&self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Interface | TypeKind::Union)
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Union)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum)
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::InputObject => "input object",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Deprecation {
    pub reason: Option<String>,
}

/// Directives recognised by composition, parsed into typed payloads, plus every other
/// directive carried along untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberDirectives {
    pub inaccessible: bool,
    pub tags: Vec<TagDirective>,
    pub keys: Vec<KeyDirective>,
    pub sources: Vec<SourceDirective>,
    pub requires: Option<RequiresDirective>,
    pub is: Option<IsDirective>,
    pub other: Vec<OpaqueDirective>,
}

/// The schema that resolves a composed field and the name the field has there.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSource {
    pub schema: String,
    pub original_name: String,
    pub requires: Option<RequiresDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub arguments: IndexMap<String, InputValueDefinition>,
    pub deprecation: Option<Deprecation>,
    pub directives: MemberDirectives,
    pub sources: Vec<FieldSource>,
}

impl FieldDefinition {
    pub fn is_accessible(&self) -> bool {
        !self.directives.inaccessible
    }

    pub fn source(&self, schema: &str) -> Option<&FieldSource> {
        self.sources.iter().find(|source| source.schema == schema)
    }

    pub fn is_resolved_by(&self, schema: &str) -> bool {
        self.source(schema).is_some()
    }
}

/// An argument or an input object field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub default_value: Option<ConstValue>,
    pub deprecation: Option<Deprecation>,
    pub directives: MemberDirectives,
}

impl InputValueDefinition {
    pub fn is_accessible(&self) -> bool {
        !self.directives.inaccessible
    }

    /// Non-null without a default: a caller must always provide it.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && matches!(self.default_value, None | Some(Value::Null))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
    pub directives: MemberDirectives,
}

impl EnumValueDefinition {
    pub fn is_accessible(&self) -> bool {
        !self.directives.inaccessible
    }
}

/// A named type of a source or composed schema. Member collections that do not apply to
/// the type's kind stay empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: IndexMap<String, FieldDefinition>,
    pub union_members: Vec<String>,
    pub enum_values: IndexMap<String, EnumValueDefinition>,
    pub input_fields: IndexMap<String, InputValueDefinition>,
    pub directives: MemberDirectives,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        TypeDefinition {
            name: name.into(),
            kind,
            description: None,
            interfaces: Vec::new(),
            fields: IndexMap::new(),
            union_members: Vec::new(),
            enum_values: IndexMap::new(),
            input_fields: IndexMap::new(),
            directives: MemberDirectives::default(),
        }
    }

    pub fn is_accessible(&self) -> bool {
        !self.directives.inaccessible
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn is_entity(&self) -> bool {
        !self.directives.keys.is_empty()
    }
}
