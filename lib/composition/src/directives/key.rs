use std::fmt::{self, Display};

use graphql_parser::query::{parse_query, Definition, OperationDefinition, Selection, SelectionSet};
use graphql_parser::schema::Directive;

use super::directive_trait::{string_argument, DirectiveError, FusionDirective};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyFieldsParseError {
    #[error("{0}")]
    Syntax(String),
    #[error("key selections may only contain plain fields, found {0}")]
    Unsupported(&'static str),
    #[error("key selection is empty")]
    Empty,
}

/// A field of an entity key, with its nested key fields for composite values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyField {
    pub name: String,
    pub children: Vec<KeyField>,
}

impl Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.children.is_empty() {
            write!(f, " {{ ")?;
            for (index, child) in self.children.iter().enumerate() {
                if index > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDirective {
    pub fields: String,
    pub selection: Result<Vec<KeyField>, KeyFieldsParseError>,
}

impl KeyDirective {
    pub fn new(fields: impl Into<String>) -> Self {
        let fields = fields.into();
        let selection = parse_key_fields(&fields);
        KeyDirective { fields, selection }
    }
}

impl FusionDirective for KeyDirective {
    const NAME: &'static str = "key";

    fn parse(directive: &Directive<'_, String>) -> Result<Self, DirectiveError> {
        Ok(KeyDirective::new(string_argument(directive, Self::NAME, "fields")?))
    }
}

fn parse_key_fields(fields: &str) -> Result<Vec<KeyField>, KeyFieldsParseError> {
    let source = format!("{{{}}}", fields);
    let document = parse_query::<String>(&source)
        .map_err(|err| KeyFieldsParseError::Syntax(err.to_string()))?;

    let selection_set = match document.definitions.first() {
        Some(Definition::Operation(OperationDefinition::SelectionSet(selection_set)))
            if document.definitions.len() == 1 =>
        {
            selection_set
        }
        _ => return Err(KeyFieldsParseError::Unsupported("a document")),
    };

    let key_fields = convert_selection_set(selection_set)?;
    if key_fields.is_empty() {
        return Err(KeyFieldsParseError::Empty);
    }
    Ok(key_fields)
}

fn convert_selection_set(
    selection_set: &SelectionSet<'_, String>,
) -> Result<Vec<KeyField>, KeyFieldsParseError> {
    selection_set
        .items
        .iter()
        .map(|selection| match selection {
            Selection::Field(field) => {
                if field.alias.is_some() {
                    return Err(KeyFieldsParseError::Unsupported("an alias"));
                }
                if !field.arguments.is_empty() {
                    return Err(KeyFieldsParseError::Unsupported("arguments"));
                }
                if !field.directives.is_empty() {
                    return Err(KeyFieldsParseError::Unsupported("directives"));
                }
                Ok(KeyField {
                    name: field.name.clone(),
                    children: convert_selection_set(&field.selection_set)?,
                })
            }
            Selection::FragmentSpread(_) => Err(KeyFieldsParseError::Unsupported("a fragment spread")),
            Selection::InlineFragment(_) => Err(KeyFieldsParseError::Unsupported("an inline fragment")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_key() {
        let key = KeyDirective::new("id organization { id }");
        let fields = key.selection.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].to_string(), "organization { id }");
    }

    #[test]
    fn rejects_invalid_keys() {
        assert!(matches!(
            KeyDirective::new("id {").selection,
            Err(KeyFieldsParseError::Syntax(_))
        ));
        assert_eq!(
            KeyDirective::new("... on A { id }").selection,
            Err(KeyFieldsParseError::Unsupported("an inline fragment"))
        );
        assert_eq!(
            KeyDirective::new("id: upc").selection,
            Err(KeyFieldsParseError::Unsupported("an alias"))
        );
    }
}
