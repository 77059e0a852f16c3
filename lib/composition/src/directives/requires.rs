use graphql_parser::schema::Directive;

use super::directive_trait::{string_argument, DirectiveError, FusionDirective};
use crate::selection_map::{parse_selection_map, SelectionMap, SelectionMapParseError};

/// A selection-map argument kept together with its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMapArgument {
    pub source: String,
    pub parsed: Result<SelectionMap, SelectionMapParseError>,
}

impl SelectionMapArgument {
    pub fn new(source: String) -> Self {
        let parsed = parse_selection_map(&source);
        SelectionMapArgument { source, parsed }
    }
}

/// `@requires(field:)`: fields of the declaring type that must accompany the field when it
/// is fetched from its source schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiresDirective {
    pub field: SelectionMapArgument,
}

impl FusionDirective for RequiresDirective {
    const NAME: &'static str = "requires";

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        Ok(RequiresDirective {
            field: SelectionMapArgument::new(string_argument(directive, Self::NAME, "field")?),
        })
    }
}
