use graphql_parser::schema::{Directive, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("@{directive} is missing the required argument \"{argument}\"")]
    MissingArgument {
        directive: &'static str,
        argument: &'static str,
    },
    #[error("argument \"{argument}\" of @{directive} must be {expected}")]
    InvalidArgument {
        directive: &'static str,
        argument: &'static str,
        expected: &'static str,
    },
}

pub trait FusionDirective: Sized {
    const NAME: &'static str;

    fn is(directive: &Directive<'_, String>) -> bool {
        directive.name == Self::NAME
    }

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError>;
}

pub(crate) fn argument<'d, 'a>(
    directive: &'d Directive<'a, String>,
    name: &str,
) -> Option<&'d Value<'a, String>> {
    directive
        .arguments
        .iter()
        .find(|(arg_name, _)| arg_name == name)
        .map(|(_, value)| value)
}

pub(crate) fn optional_string_argument(
    directive: &Directive<'_, String>,
    directive_name: &'static str,
    name: &'static str,
) -> Result<Option<String>, DirectiveError> {
    match argument(directive, name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(DirectiveError::InvalidArgument {
            directive: directive_name,
            argument: name,
            expected: "a string",
        }),
    }
}

pub(crate) fn string_argument(
    directive: &Directive<'_, String>,
    directive_name: &'static str,
    name: &'static str,
) -> Result<String, DirectiveError> {
    optional_string_argument(directive, directive_name, name)?.ok_or(
        DirectiveError::MissingArgument {
            directive: directive_name,
            argument: name,
        },
    )
}
