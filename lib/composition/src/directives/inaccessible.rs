use graphql_parser::schema::Directive;

use super::directive_trait::{DirectiveError, FusionDirective};

/// Hides a member from the client-facing schema while keeping it available for composition
/// and for sub-queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InaccessibleDirective;

impl FusionDirective for InaccessibleDirective {
    const NAME: &'static str = "inaccessible";

    fn parse(_directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        Ok(InaccessibleDirective)
    }
}
