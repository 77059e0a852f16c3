use graphql_parser::schema::{Directive, Value};

use super::directive_trait::{argument, optional_string_argument, DirectiveError, FusionDirective};

/// `@source(schema:, name:)`: the field is resolved by `schema`, where it is called `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDirective {
    pub schema: String,
    pub name: Option<String>,
}

impl FusionDirective for SourceDirective {
    const NAME: &'static str = "source";

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        let schema = match argument(directive, "schema") {
            Some(Value::String(value)) | Some(Value::Enum(value)) => value.clone(),
            None | Some(Value::Null) => {
                return Err(DirectiveError::MissingArgument {
                    directive: Self::NAME,
                    argument: "schema",
                })
            }
            Some(_) => {
                return Err(DirectiveError::InvalidArgument {
                    directive: Self::NAME,
                    argument: "schema",
                    expected: "a string or an enum value",
                })
            }
        };

        Ok(SourceDirective {
            schema,
            name: optional_string_argument(directive, Self::NAME, "name")?,
        })
    }
}
