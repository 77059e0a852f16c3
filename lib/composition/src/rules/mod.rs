//! Validation rules run over the composed schema after merging.
//!
//! Each rule is a pure function from a member event to the diagnostics it raises. The
//! dispatcher walks the composed schema once, raises one event per member and calls the
//! rules registered for that member kind.

use std::collections::HashMap;

use tracing::{instrument, trace};

use crate::composed_schema::ComposedSchema;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::{FieldDefinition, InputValueDefinition, TypeDefinition, TypeKind};
use crate::selection_map::SchemaView;
use crate::source_schema::SourceSchema;

mod default_values;
mod empty_types;
mod enum_values;
mod inaccessible_references;
mod interfaces;
mod is_directive;
mod keys;
mod query_root;
mod required_inputs;
mod requires;
mod sources;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Schema,
    ObjectType,
    InterfaceType,
    UnionType,
    EnumType,
    InputType,
    ScalarType,
    OutputField,
    FieldArgument,
    InputField,
}

#[derive(Debug, Clone, Copy)]
pub enum MemberEvent<'a> {
    Schema,
    Type(&'a TypeDefinition),
    OutputField {
        parent: &'a TypeDefinition,
        field: &'a FieldDefinition,
    },
    FieldArgument {
        parent: &'a TypeDefinition,
        field: &'a FieldDefinition,
        argument: &'a InputValueDefinition,
    },
    InputField {
        parent: &'a TypeDefinition,
        field: &'a InputValueDefinition,
    },
}

impl MemberEvent<'_> {
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberEvent::Schema => MemberKind::Schema,
            MemberEvent::Type(definition) => match definition.kind {
                TypeKind::Object => MemberKind::ObjectType,
                TypeKind::Interface => MemberKind::InterfaceType,
                TypeKind::Union => MemberKind::UnionType,
                TypeKind::Enum => MemberKind::EnumType,
                TypeKind::InputObject => MemberKind::InputType,
                TypeKind::Scalar => MemberKind::ScalarType,
            },
            MemberEvent::OutputField { .. } => MemberKind::OutputField,
            MemberEvent::FieldArgument { .. } => MemberKind::FieldArgument,
            MemberEvent::InputField { .. } => MemberKind::InputField,
        }
    }
}

/// What a rule may look at: the composed schema and the source schemas it came from.
pub struct RuleContext<'a> {
    pub schema: &'a ComposedSchema,
    pub sources: &'a [SourceSchema],
}

impl<'a> RuleContext<'a> {
    pub fn source_schema(&self, name: &str) -> Option<&'a SourceSchema> {
        self.sources.iter().find(|source| source.name() == name)
    }

    /// Source schemas defining a type of the given name, in composition order.
    pub fn sources_defining(&self, type_name: &'a str) -> impl Iterator<Item = &'a SourceSchema> {
        let sources = self.sources;
        sources
            .iter()
            .filter(move |source| source.type_definition(type_name).is_some())
    }
}

pub type RuleFn = fn(&MemberEvent<'_>, &RuleContext<'_>) -> Vec<Diagnostic>;

pub struct Rule {
    pub name: &'static str,
    pub events: &'static [MemberKind],
    pub check: RuleFn,
}

pub static DEFAULT_RULES: &[Rule] = &[
    query_root::RULE,
    empty_types::RULE,
    interfaces::RULE,
    default_values::RULE,
    inaccessible_references::RULE,
    required_inputs::RULE,
    keys::RULE,
    requires::RULE,
    is_directive::RULE,
    enum_values::RULE,
    sources::RULE,
];

pub struct RuleDispatcher {
    table: HashMap<MemberKind, Vec<&'static Rule>>,
}

impl Default for RuleDispatcher {
    fn default() -> Self {
        RuleDispatcher::new(DEFAULT_RULES)
    }
}

impl RuleDispatcher {
    pub fn new(rules: &'static [Rule]) -> Self {
        let mut table: HashMap<MemberKind, Vec<&'static Rule>> = HashMap::new();
        for rule in rules {
            for kind in rule.events {
                table.entry(*kind).or_default().push(rule);
            }
        }
        RuleDispatcher { table }
    }

    fn raise(&self, event: MemberEvent<'_>, context: &RuleContext<'_>, sink: &mut Diagnostics) {
        let Some(rules) = self.table.get(&event.kind()) else {
            return;
        };
        for rule in rules {
            let diagnostics = (rule.check)(&event, context);
            if !diagnostics.is_empty() {
                trace!(rule = rule.name, count = diagnostics.len(), "rule raised diagnostics");
            }
            sink.extend(diagnostics);
        }
    }

    /// Walks the composed schema: the schema itself first, then every type followed by its
    /// fields and their arguments, in composition order.
    #[instrument(level = "trace", skip_all)]
    pub fn run(&self, context: &RuleContext<'_>, sink: &mut Diagnostics) {
        self.raise(MemberEvent::Schema, context, sink);

        for definition in context.schema.types() {
            self.raise(MemberEvent::Type(definition), context, sink);

            for field in definition.fields.values() {
                self.raise(
                    MemberEvent::OutputField {
                        parent: definition,
                        field,
                    },
                    context,
                    sink,
                );
                for argument in field.arguments.values() {
                    self.raise(
                        MemberEvent::FieldArgument {
                            parent: definition,
                            field,
                            argument,
                        },
                        context,
                        sink,
                    );
                }
            }

            for field in definition.input_fields.values() {
                self.raise(
                    MemberEvent::InputField {
                        parent: definition,
                        field,
                    },
                    context,
                    sink,
                );
            }
        }
    }
}
