use graphql_parser::query::{Directive, Field, FragmentDefinition, Selection, Value, VariableDefinition};
use indexmap::{IndexMap, IndexSet};

use crate::error::ExtractionError;

/// Variables and fragment definitions a rewritten root field depends on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldUsage {
    pub variables: IndexSet<String>,
    pub fragments: IndexSet<String>,
}

/// Walks `field`, following spreads into `fragments`, and records every variable and
/// fragment it uses.
pub fn field_usage(
    field: &Field<'static, String>,
    fragments: &IndexMap<String, FragmentDefinition<'static, String>>,
) -> FieldUsage {
    let mut usage = FieldUsage::default();
    collect_field(field, fragments, &mut usage);
    usage
}

fn collect_field(
    field: &Field<'static, String>,
    fragments: &IndexMap<String, FragmentDefinition<'static, String>>,
    usage: &mut FieldUsage,
) {
    for (_, value) in &field.arguments {
        collect_value(value, &mut usage.variables);
    }
    collect_directives(&field.directives, &mut usage.variables);
    collect_selections(&field.selection_set.items, fragments, usage);
}

fn collect_selections(
    items: &[Selection<'static, String>],
    fragments: &IndexMap<String, FragmentDefinition<'static, String>>,
    usage: &mut FieldUsage,
) {
    for item in items {
        match item {
            Selection::Field(field) => collect_field(field, fragments, usage),
            Selection::InlineFragment(fragment) => {
                collect_directives(&fragment.directives, &mut usage.variables);
                collect_selections(&fragment.selection_set.items, fragments, usage);
            }
            Selection::FragmentSpread(spread) => {
                collect_directives(&spread.directives, &mut usage.variables);
                if !usage.fragments.insert(spread.fragment_name.clone()) {
                    continue;
                }
                if let Some(definition) = fragments.get(&spread.fragment_name) {
                    collect_directives(&definition.directives, &mut usage.variables);
                    collect_selections(&definition.selection_set.items, fragments, usage);
                }
            }
        }
    }
}

fn collect_directives(directives: &[Directive<'static, String>], variables: &mut IndexSet<String>) {
    for directive in directives {
        for (_, value) in &directive.arguments {
            collect_value(value, variables);
        }
    }
}

fn collect_value(value: &Value<'static, String>, variables: &mut IndexSet<String>) {
    match value {
        Value::Variable(name) => {
            variables.insert(name.clone());
        }
        Value::List(items) => items.iter().for_each(|item| collect_value(item, variables)),
        Value::Object(fields) => fields.values().for_each(|item| collect_value(item, variables)),
        _ => {}
    }
}

/// The client's variable definitions for `used`, in the order the client declared them.
pub fn filter_variable_definitions<'d>(
    definitions: &'d [VariableDefinition<'static, String>],
    used: &IndexSet<String>,
) -> Result<Vec<&'d VariableDefinition<'static, String>>, ExtractionError> {
    if let Some(undefined) = used
        .iter()
        .find(|name| !definitions.iter().any(|definition| &definition.name == *name))
    {
        return Err(ExtractionError::UndefinedVariable {
            variable_name: undefined.clone(),
        });
    }

    Ok(definitions
        .iter()
        .filter(|definition| used.contains(&definition.name))
        .collect())
}
