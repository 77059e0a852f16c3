use std::collections::HashMap;
use std::fmt::{self, Display};

use graphql_parser::query::{
    Definition, Document, FragmentDefinition, OperationDefinition, SelectionSet,
    VariableDefinition,
};
use serde::Serialize;
use tracing::trace;

use crate::error::ExtractionError;
use crate::utils::parsing::parse_operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The operation a client asked to execute, selected out of its document, with the
/// fragment definitions it may spread.
#[derive(Debug, Clone)]
pub struct ClientOperation {
    pub kind: OperationKind,
    pub name: Option<String>,
    pub variable_definitions: Vec<VariableDefinition<'static, String>>,
    pub selection_set: SelectionSet<'static, String>,
    pub fragments: HashMap<String, FragmentDefinition<'static, String>>,
}

impl ClientOperation {
    pub fn parse(source: &str, operation_name: Option<&str>) -> Result<Self, ExtractionError> {
        Self::from_document(parse_operation(source)?, operation_name)
    }

    /// Picks the operation named `operation_name`, or the only operation of the document
    /// when no name is given.
    pub fn from_document(
        document: Document<'static, String>,
        operation_name: Option<&str>,
    ) -> Result<Self, ExtractionError> {
        let mut fragments = HashMap::new();
        let mut candidates = Vec::new();

        for definition in document.definitions {
            match definition {
                Definition::Fragment(fragment) => {
                    fragments.insert(fragment.name.clone(), fragment);
                }
                Definition::Operation(operation) => {
                    let name = match &operation {
                        OperationDefinition::SelectionSet(_) => None,
                        OperationDefinition::Query(query) => query.name.as_deref(),
                        OperationDefinition::Mutation(mutation) => mutation.name.as_deref(),
                        OperationDefinition::Subscription(subscription) => {
                            subscription.name.as_deref()
                        }
                    };
                    let is_candidate = match operation_name {
                        Some(expected) => name == Some(expected),
                        None => true,
                    };
                    if is_candidate {
                        candidates.push(operation);
                    }
                }
            }
        }

        if candidates.len() > 1 {
            return Err(ExtractionError::MultipleOperations);
        }
        let operation = match (candidates.pop(), operation_name) {
            (Some(operation), _) => operation,
            (None, Some(name)) => {
                return Err(ExtractionError::SpecifiedOperationNotFound {
                    operation_name: name.to_string(),
                })
            }
            (None, None) => return Err(ExtractionError::OperationNotFound),
        };

        let (kind, name, variable_definitions, selection_set) = match operation {
            OperationDefinition::SelectionSet(selection_set) => {
                (OperationKind::Query, None, Vec::new(), selection_set)
            }
            OperationDefinition::Query(query) => (
                OperationKind::Query,
                query.name,
                query.variable_definitions,
                query.selection_set,
            ),
            OperationDefinition::Mutation(mutation) => (
                OperationKind::Mutation,
                mutation.name,
                mutation.variable_definitions,
                mutation.selection_set,
            ),
            OperationDefinition::Subscription(subscription) => (
                OperationKind::Subscription,
                subscription.name,
                subscription.variable_definitions,
                subscription.selection_set,
            ),
        };

        trace!(kind = %kind, name = ?name, fragments = fragments.len(), "selected client operation");

        Ok(ClientOperation {
            kind,
            name,
            variable_definitions,
            selection_set,
            fragments,
        })
    }

    pub fn fragment(&self, name: &str) -> Result<&FragmentDefinition<'static, String>, ExtractionError> {
        self.fragments
            .get(name)
            .ok_or_else(|| ExtractionError::UnknownFragment {
                fragment_name: name.to_string(),
            })
    }

    pub fn variable_definition(&self, name: &str) -> Option<&VariableDefinition<'static, String>> {
        self.variable_definitions
            .iter()
            .find(|definition| definition.name == name)
    }
}
