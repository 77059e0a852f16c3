//! Field selection maps, the small language used by `@requires(field:)` and `@is(field:)`
//! to describe which values of an output type feed an argument or a requirement.

use std::fmt::{self, Display};

mod error;
mod parser;
mod validator;

pub use error::{SelectionMapError, SelectionMapParseError};
pub use parser::parse_selection_map;
pub use validator::{validate_selection_map, SchemaView, SelectionMapValidation};

/// Root of a parsed selection map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMap {
    pub value: SelectedValue,
}

/// One or more alternatives separated by `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedValue {
    pub entries: Vec<SelectedValueEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedValueEntry {
    Path {
        path: Path,
        selection: Option<PathSelection>,
    },
    Object(SelectedObjectValue),
}

/// What follows a path: `.{ ... }` or `[ ... ]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSelection {
    Object(SelectedObjectValue),
    List(Box<SelectedValue>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// `<Type>.` prefix applied to the value the path starts from.
    pub type_condition: Option<String>,
    pub segment: PathSegment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub field: String,
    pub type_condition: Option<String>,
    pub next: Option<Box<PathSegment>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedObjectValue {
    pub fields: Vec<SelectedObjectField>,
}

/// `name` or `name: SelectedValue`; the short form selects the output field of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedObjectField {
    pub name: String,
    pub value: Option<SelectedValue>,
}

impl PathSegment {
    pub fn iter(&self) -> PathSegmentIter<'_> {
        PathSegmentIter {
            current: Some(self),
        }
    }
}

pub struct PathSegmentIter<'a> {
    current: Option<&'a PathSegment>,
}

impl<'a> Iterator for PathSegmentIter<'a> {
    type Item = &'a PathSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.next.as_deref();
        Some(current)
    }
}

impl Display for SelectionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Display for SelectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl Display for SelectedValueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectedValueEntry::Path { path, selection } => {
                write!(f, "{}", path)?;
                match selection {
                    Some(PathSelection::Object(object)) => write!(f, ".{}", object),
                    Some(PathSelection::List(inner)) => write!(f, "[{}]", inner),
                    None => Ok(()),
                }
            }
            SelectedValueEntry::Object(object) => write!(f, "{}", object),
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(type_condition) = &self.type_condition {
            write!(f, "<{}>.", type_condition)?;
        }
        write!(f, "{}", self.segment)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if let Some(type_condition) = &self.type_condition {
            write!(f, "<{}>", type_condition)?;
        }
        if let Some(next) = &self.next {
            write!(f, ".{}", next)?;
        }
        Ok(())
    }
}

impl Display for SelectedObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", field.name)?;
            if let Some(value) = &field.value {
                write!(f, ": {}", value)?;
            }
        }
        write!(f, " }}")
    }
}
