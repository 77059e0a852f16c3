use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Stable address of a schema member, used in diagnostics and in `@is(coordinate:)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaCoordinate {
    Type(String),
    Member(String, String),
    Argument(String, String, String),
    Directive(String),
    DirectiveArgument(String, String),
}

impl SchemaCoordinate {
    pub fn ty(name: impl Into<String>) -> Self {
        SchemaCoordinate::Type(name.into())
    }

    pub fn member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        SchemaCoordinate::Member(type_name.into(), member.into())
    }

    pub fn argument(
        type_name: impl Into<String>,
        field: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        SchemaCoordinate::Argument(type_name.into(), field.into(), argument.into())
    }

    /// The type part of the coordinate, if it addresses a type or one of its members.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            SchemaCoordinate::Type(name)
            | SchemaCoordinate::Member(name, _)
            | SchemaCoordinate::Argument(name, _, _) => Some(name),
            SchemaCoordinate::Directive(_) | SchemaCoordinate::DirectiveArgument(_, _) => None,
        }
    }
}

impl Display for SchemaCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaCoordinate::Type(name) => write!(f, "{}", name),
            SchemaCoordinate::Member(ty, member) => write!(f, "{}.{}", ty, member),
            SchemaCoordinate::Argument(ty, field, arg) => write!(f, "{}.{}({}:)", ty, field, arg),
            SchemaCoordinate::Directive(name) => write!(f, "@{}", name),
            SchemaCoordinate::DirectiveArgument(name, arg) => write!(f, "@{}({}:)", name, arg),
        }
    }
}

impl Serialize for SchemaCoordinate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid schema coordinate \"{input}\": {reason}")]
pub struct SchemaCoordinateParseError {
    pub input: String,
    pub reason: &'static str,
}

fn is_name(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl FromStr for SchemaCoordinate {
    type Err = SchemaCoordinateParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = |reason| SchemaCoordinateParseError {
            input: input.to_string(),
            reason,
        };
        let trimmed = input.trim();

        let (is_directive, body) = match trimmed.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (path, argument) = match body.find('(') {
            Some(open) => {
                let close = body
                    .strip_suffix(')')
                    .ok_or_else(|| error("missing closing parenthesis"))?;
                let argument = close[open + 1..].trim();
                let argument = argument.strip_suffix(':').unwrap_or(argument).trim();
                if !is_name(argument) {
                    return Err(error("argument name is not a valid name"));
                }
                (&body[..open], Some(argument.to_string()))
            }
            None => (body, None),
        };

        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(error("too many path segments"));
        }
        if !is_name(first) || second.is_some_and(|member| !is_name(member)) {
            return Err(error("path segments must be valid names"));
        }

        match (is_directive, second, argument) {
            (true, None, None) => Ok(SchemaCoordinate::Directive(first.to_string())),
            (true, None, Some(arg)) => Ok(SchemaCoordinate::DirectiveArgument(first.to_string(), arg)),
            (true, Some(_), _) => Err(error("directive coordinates cannot address members")),
            (false, None, None) => Ok(SchemaCoordinate::Type(first.to_string())),
            (false, None, Some(_)) => Err(error("arguments require a field")),
            (false, Some(member), None) => {
                Ok(SchemaCoordinate::Member(first.to_string(), member.to_string()))
            }
            (false, Some(field), Some(arg)) => Ok(SchemaCoordinate::Argument(
                first.to_string(),
                field.to_string(),
                arg,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_every_form() {
        for input in ["Product", "Product.id", "Query.product(id:)", "@key", "@key(fields:)"] {
            let coordinate: SchemaCoordinate = input.parse().unwrap();
            assert_eq!(coordinate.to_string(), input);
        }
    }

    #[test]
    fn accepts_argument_without_colon() {
        let coordinate: SchemaCoordinate = "Query.product(id)".parse().unwrap();
        assert_eq!(coordinate, SchemaCoordinate::argument("Query", "product", "id"));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "Product.", "A.b.c", "Query.product(id:", "@key.fields", "1Type"] {
            assert!(input.parse::<SchemaCoordinate>().is_err(), "{input}");
        }
    }
}
