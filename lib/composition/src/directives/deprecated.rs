use graphql_parser::schema::Directive;

use super::directive_trait::{optional_string_argument, DirectiveError, FusionDirective};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeprecatedDirective {
    pub reason: Option<String>,
}

impl FusionDirective for DeprecatedDirective {
    const NAME: &'static str = "deprecated";

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        Ok(DeprecatedDirective {
            reason: optional_string_argument(directive, Self::NAME, "reason")?,
        })
    }
}
