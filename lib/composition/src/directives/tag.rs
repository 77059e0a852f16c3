use graphql_parser::schema::Directive;

use super::directive_trait::{string_argument, DirectiveError, FusionDirective};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagDirective {
    pub name: String,
}

impl FusionDirective for TagDirective {
    const NAME: &'static str = "tag";

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        Ok(TagDirective {
            name: string_argument(directive, Self::NAME, "name")?,
        })
    }
}
