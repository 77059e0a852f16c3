use graphql_parser::schema::{Directive, Value};

use super::directive_trait::{argument, DirectiveError, FusionDirective};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticNonNullDirective {
    pub levels: Vec<usize>,
}

impl FusionDirective for SemanticNonNullDirective {
    const NAME: &'static str = "semanticNonNull";

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        let invalid = DirectiveError::InvalidArgument {
            directive: Self::NAME,
            argument: "levels",
            expected: "a list of non-negative integers",
        };

        let levels = match argument(directive, "levels") {
            None | Some(Value::Null) => vec![0],
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Int(number) => number
                        .as_i64()
                        .and_then(|level| usize::try_from(level).ok())
                        .ok_or_else(|| invalid.clone()),
                    _ => Err(invalid.clone()),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(Value::Int(number)) => vec![number
                .as_i64()
                .and_then(|level| usize::try_from(level).ok())
                .ok_or_else(|| invalid.clone())?],
            Some(_) => return Err(invalid),
        };

        Ok(SemanticNonNullDirective { levels })
    }
}
