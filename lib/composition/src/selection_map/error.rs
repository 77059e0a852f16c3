use crate::coordinate::SchemaCoordinate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionMapParseError {
    #[error("selection map is empty")]
    Empty,
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("expected {expected} but found {found} at offset {offset}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },
    #[error("expected {expected} but reached the end of the selection map")]
    UnexpectedEnd { expected: &'static str },
}

/// A semantic problem found while resolving a selection map against a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionMapError {
    #[error("the field \"{coordinate}\" referenced by \"{path}\" does not exist")]
    UnresolvedField {
        path: String,
        coordinate: SchemaCoordinate,
    },
    #[error("type condition \"{type_condition}\" at \"{path}\" is not a possible type of \"{parent_type}\"")]
    InvalidTypeCondition {
        path: String,
        type_condition: String,
        parent_type: String,
    },
    #[error("\"{path}\" selects a list where a single value is expected, or the reverse")]
    ListMismatch { path: String },
    #[error("\"{path}\" is a leaf value of type \"{type_name}\" and cannot have a nested selection")]
    LeafRequiresNoSelection { path: String, type_name: String },
    #[error("\"{path}\" is of composite type \"{type_name}\" and requires a nested selection")]
    SelectionRequired { path: String, type_name: String },
    #[error("\"{path}\" is of type \"{found}\" but \"{expected}\" is expected")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
    #[error("the required input field \"{coordinate}\" is not selected at \"{path}\"")]
    MissingRequiredInputField {
        path: String,
        coordinate: SchemaCoordinate,
    },
}

impl SelectionMapError {
    /// The schema member the error points at, when there is one.
    pub fn coordinate(&self) -> Option<&SchemaCoordinate> {
        match self {
            SelectionMapError::UnresolvedField { coordinate, .. }
            | SelectionMapError::MissingRequiredInputField { coordinate, .. } => Some(coordinate),
            _ => None,
        }
    }
}
