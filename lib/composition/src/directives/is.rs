use graphql_parser::schema::Directive;

use super::directive_trait::{optional_string_argument, DirectiveError, FusionDirective};
use super::requires::SelectionMapArgument;
use crate::coordinate::{SchemaCoordinate, SchemaCoordinateParseError};

/// `@is(field:)` or `@is(coordinate:)` on a lookup argument, naming the output value the
/// argument corresponds to.
#[derive(Debug, Clone, PartialEq)]
pub struct IsDirective {
    pub field: Option<SelectionMapArgument>,
    pub coordinate: Option<Result<SchemaCoordinate, SchemaCoordinateParseError>>,
}

impl FusionDirective for IsDirective {
    const NAME: &'static str = "is";

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        Ok(IsDirective {
            field: optional_string_argument(directive, Self::NAME, "field")?
                .map(SelectionMapArgument::new),
            coordinate: optional_string_argument(directive, Self::NAME, "coordinate")?
                .map(|coordinate| coordinate.parse::<SchemaCoordinate>()),
        })
    }
}
