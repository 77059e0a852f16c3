use graphql_parser::query::{Directive, Value as Literal};
use hive_fusion_query_planner::ClientOperation;
use indexmap::IndexMap;

use crate::response::value::Value;

/// Evaluates `@skip(if:)` and `@include(if:)` against the request variables, falling back
/// to the defaults the operation declares.
pub struct FieldConditions<'a> {
    operation: &'a ClientOperation,
    variables: &'a IndexMap<String, Value>,
}

impl<'a> FieldConditions<'a> {
    pub fn new(operation: &'a ClientOperation, variables: &'a IndexMap<String, Value>) -> Self {
        FieldConditions {
            operation,
            variables,
        }
    }

    pub fn is_included(&self, directives: &[Directive<'static, String>]) -> bool {
        directives.iter().all(|directive| match directive.name.as_str() {
            "skip" => !self.condition(directive),
            "include" => self.condition(directive),
            _ => true,
        })
    }

    fn condition(&self, directive: &Directive<'static, String>) -> bool {
        directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .map_or(false, |(_, value)| self.is_true(value))
    }

    fn is_true(&self, value: &Literal<'static, String>) -> bool {
        match value {
            Literal::Boolean(flag) => *flag,
            Literal::Variable(name) => self
                .variable_value(name)
                .and_then(|value| value.as_bool())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn variable_value(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned().or_else(|| {
            self.operation
                .variable_definition(name)
                .and_then(|definition| definition.default_value.as_ref())
                .map(Value::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(operation: &ClientOperation) -> &[Directive<'static, String>] {
        match &operation.selection_set.items[0] {
            graphql_parser::query::Selection::Field(field) => &field.directives,
            _ => panic!("expected a field"),
        }
    }

    #[test]
    fn evaluates_literals_variables_and_defaults() {
        let operation = ClientOperation::parse(
            "query ($a: Boolean!, $b: Boolean = true) { x @include(if: $a) @skip(if: $b) }",
            None,
        )
        .unwrap();

        let mut variables = IndexMap::new();
        variables.insert("a".to_string(), Value::Bool(true));
        assert!(!FieldConditions::new(&operation, &variables).is_included(directives(&operation)));

        variables.insert("b".to_string(), Value::Bool(false));
        assert!(FieldConditions::new(&operation, &variables).is_included(directives(&operation)));

        let literal = ClientOperation::parse("{ x @skip(if: false) @include(if: true) }", None).unwrap();
        assert!(FieldConditions::new(&literal, &IndexMap::new()).is_included(directives(&literal)));
    }
}
