//! Composition directives recognised on source-schema members.

mod deprecated;
mod directive_trait;
mod inaccessible;
mod is;
mod key;
mod requires;
mod semantic_non_null;
mod source;
mod tag;

pub use deprecated::DeprecatedDirective;
pub use directive_trait::{DirectiveError, FusionDirective};
pub use inaccessible::InaccessibleDirective;
pub use is::IsDirective;
pub use key::{KeyDirective, KeyField, KeyFieldsParseError};
pub use requires::{RequiresDirective, SelectionMapArgument};
pub use semantic_non_null::SemanticNonNullDirective;
pub use source::SourceDirective;
pub use tag::TagDirective;

/// Directives consumed by composition. They never reach a source schema in a sub-query.
pub const COMPOSITION_DIRECTIVES: [&str; 7] = [
    SourceDirective::NAME,
    KeyDirective::NAME,
    RequiresDirective::NAME,
    IsDirective::NAME,
    InaccessibleDirective::NAME,
    TagDirective::NAME,
    SemanticNonNullDirective::NAME,
];

pub fn is_composition_directive(name: &str) -> bool {
    COMPOSITION_DIRECTIVES.contains(&name)
}

/// Definitions printed at the top of the composed SDL.
pub const COMPOSITION_DIRECTIVE_DEFINITIONS: &str = r#"directive @source(schema: String!, name: String) repeatable on FIELD_DEFINITION
directive @key(fields: String!) repeatable on OBJECT | INTERFACE
directive @requires(field: String!) on FIELD_DEFINITION
directive @is(field: String, coordinate: String) on ARGUMENT_DEFINITION
directive @inaccessible on OBJECT | INTERFACE | UNION | ENUM | INPUT_OBJECT | SCALAR | FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
directive @tag(name: String!) repeatable on OBJECT | INTERFACE | UNION | ENUM | INPUT_OBJECT | SCALAR | FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
directive @semanticNonNull(levels: [Int] = [0]) on FIELD_DEFINITION
"#;
