use std::fmt::{self, Display, Formatter};

use graphql_parser::query::Value;

use crate::composed_schema::ComposedSchema;
use crate::directives::COMPOSITION_DIRECTIVE_DEFINITIONS;
use crate::schema::{
    Deprecation, FieldDefinition, InputValueDefinition, MemberDirectives, OpaqueDirective,
    TypeDefinition, TypeKind,
};
use crate::selection_map::SchemaView;
use crate::source_schema::RootOperationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SdlAudience {
    Composed,
    Client,
}

pub(crate) fn render_sdl(schema: &ComposedSchema, audience: SdlAudience) -> String {
    SdlPrinter { schema, audience }.to_string()
}

struct SdlPrinter<'a> {
    schema: &'a ComposedSchema,
    audience: SdlAudience,
}

pub(crate) fn render_value(value: &Value<'_, String>) -> String {
    match value {
        Value::Variable(name) => format!("${}", name),
        Value::Int(number) => number
            .as_i64()
            .map(|number| number.to_string())
            .unwrap_or_default(),
        Value::Float(number) => number.to_string(),
        Value::String(text) => format!("\"{}\"", escape_string(text)),
        Value::Boolean(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Enum(name) => name.clone(),
        Value::List(items) => format!(
            "[{}]",
            items.iter().map(render_value).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(fields) => format!(
            "{{{}}}",
            fields
                .iter()
                .map(|(name, value)| format!("{}: {}", name, render_value(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl SdlPrinter<'_> {
    fn is_client(&self) -> bool {
        self.audience == SdlAudience::Client
    }

    fn is_visible_type(&self, name: &str) -> bool {
        !self.is_client()
            || self
                .schema
                .type_definition(name)
                .map_or(true, TypeDefinition::is_accessible)
    }

    fn write_description(
        &self,
        f: &mut Formatter<'_>,
        description: &Option<String>,
        indent: &str,
    ) -> fmt::Result {
        match description {
            Some(description) if description.contains('\n') => {
                writeln!(f, "{}\"\"\"", indent)?;
                for line in description.lines() {
                    writeln!(f, "{}{}", indent, line)?;
                }
                writeln!(f, "{}\"\"\"", indent)
            }
            Some(description) => {
                writeln!(f, "{}\"{}\"", indent, escape_string(description))
            }
            None => Ok(()),
        }
    }

    fn write_member_directives(
        &self,
        f: &mut Formatter<'_>,
        directives: &MemberDirectives,
        deprecation: &Option<Deprecation>,
    ) -> fmt::Result {
        if let Some(deprecation) = deprecation {
            match &deprecation.reason {
                Some(reason) => write!(f, " @deprecated(reason: \"{}\")", escape_string(reason))?,
                None => write!(f, " @deprecated")?,
            }
        }
        if !self.is_client() {
            for key in &directives.keys {
                write!(f, " @key(fields: \"{}\")", escape_string(&key.fields))?;
            }
            if let Some(requires) = &directives.requires {
                write!(
                    f,
                    " @requires(field: \"{}\")",
                    escape_string(&requires.field.source)
                )?;
            }
            if let Some(is) = &directives.is {
                if let Some(field) = &is.field {
                    write!(f, " @is(field: \"{}\")", escape_string(&field.source))?;
                }
                if let Some(Ok(coordinate)) = &is.coordinate {
                    write!(f, " @is(coordinate: \"{}\")", coordinate)?;
                }
            }
            for tag in &directives.tags {
                write!(f, " @tag(name: \"{}\")", escape_string(&tag.name))?;
            }
            if directives.inaccessible {
                write!(f, " @inaccessible")?;
            }
        }
        for directive in &directives.other {
            self.write_opaque_directive(f, directive)?;
        }
        Ok(())
    }

    fn write_opaque_directive(&self, f: &mut Formatter<'_>, directive: &OpaqueDirective) -> fmt::Result {
        write!(f, " @{}", directive.name)?;
        if !directive.arguments.is_empty() {
            let arguments = directive
                .arguments
                .iter()
                .map(|(name, value)| format!("{}: {}", name, render_value(value)))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "({})", arguments)?;
        }
        Ok(())
    }

    fn write_input_value(&self, f: &mut Formatter<'_>, value: &InputValueDefinition) -> fmt::Result {
        write!(f, "{}: {}", value.name, value.ty)?;
        if let Some(default_value) = &value.default_value {
            write!(f, " = {}", render_value(default_value))?;
        }
        self.write_member_directives(f, &value.directives, &value.deprecation)
    }

    fn write_field(&self, f: &mut Formatter<'_>, field: &FieldDefinition) -> fmt::Result {
        self.write_description(f, &field.description, "  ")?;
        write!(f, "  {}", field.name)?;

        let arguments = field
            .arguments
            .values()
            .filter(|argument| {
                !self.is_client()
                    || (argument.is_accessible() && self.is_visible_type(argument.ty.named_type()))
            })
            .collect::<Vec<_>>();
        if !arguments.is_empty() {
            write!(f, "(")?;
            for (index, argument) in arguments.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                self.write_input_value(f, argument)?;
            }
            write!(f, ")")?;
        }

        write!(f, ": {}", field.ty)?;
        let levels = field.ty.semantic_non_null_levels();
        if levels == [0] {
            write!(f, " @semanticNonNull")?;
        } else if !levels.is_empty() {
            let levels = levels
                .iter()
                .map(|level| level.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " @semanticNonNull(levels: [{}])", levels)?;
        }

        if !self.is_client() {
            for source in &field.sources {
                if source.original_name == field.name {
                    write!(f, " @source(schema: \"{}\")", source.schema)?;
                } else {
                    write!(
                        f,
                        " @source(schema: \"{}\", name: \"{}\")",
                        source.schema, source.original_name
                    )?;
                }
            }
        }
        self.write_member_directives(f, &field.directives, &field.deprecation)?;
        writeln!(f)
    }

    fn write_type(&self, f: &mut Formatter<'_>, definition: &TypeDefinition) -> fmt::Result {
        self.write_description(f, &definition.description, "")?;
        let keyword = match definition.kind {
            TypeKind::Scalar => "scalar",
            TypeKind::Object => "type",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::InputObject => "input",
        };
        write!(f, "{} {}", keyword, definition.name)?;

        let interfaces = definition
            .interfaces
            .iter()
            .filter(|name| self.is_visible_type(name))
            .map(String::as_str)
            .collect::<Vec<_>>();
        if !interfaces.is_empty() {
            write!(f, " implements {}", interfaces.join(" & "))?;
        }
        self.write_member_directives(f, &definition.directives, &None)?;

        match definition.kind {
            TypeKind::Scalar => writeln!(f),
            TypeKind::Union => {
                let members = definition
                    .union_members
                    .iter()
                    .filter(|name| self.is_visible_type(name))
                    .map(String::as_str)
                    .collect::<Vec<_>>();
                writeln!(f, " = {}", members.join(" | "))
            }
            TypeKind::Object | TypeKind::Interface => {
                writeln!(f, " {{")?;
                for field in definition.fields.values() {
                    if self.is_client()
                        && (!field.is_accessible() || !self.is_visible_type(field.ty.named_type()))
                    {
                        continue;
                    }
                    self.write_field(f, field)?;
                }
                writeln!(f, "}}")
            }
            TypeKind::Enum => {
                writeln!(f, " {{")?;
                for value in definition.enum_values.values() {
                    if self.is_client() && !value.is_accessible() {
                        continue;
                    }
                    self.write_description(f, &value.description, "  ")?;
                    write!(f, "  {}", value.name)?;
                    self.write_member_directives(f, &value.directives, &value.deprecation)?;
                    writeln!(f)?;
                }
                writeln!(f, "}}")
            }
            TypeKind::InputObject => {
                writeln!(f, " {{")?;
                for field in definition.input_fields.values() {
                    if self.is_client()
                        && (!field.is_accessible() || !self.is_visible_type(field.ty.named_type()))
                    {
                        continue;
                    }
                    self.write_description(f, &field.description, "  ")?;
                    write!(f, "  ")?;
                    self.write_input_value(f, field)?;
                    writeln!(f)?;
                }
                writeln!(f, "}}")
            }
        }
    }
}

impl Display for SdlPrinter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut separate = |f: &mut Formatter<'_>| -> fmt::Result {
            if !std::mem::take(&mut first) {
                writeln!(f)?;
            }
            Ok(())
        };

        if !self.is_client() {
            separate(f)?;
            write!(f, "{}", COMPOSITION_DIRECTIVE_DEFINITIONS)?;
        }

        let roots = [
            RootOperationKind::Query,
            RootOperationKind::Mutation,
            RootOperationKind::Subscription,
        ]
        .into_iter()
        .filter(|kind| self.schema.root_type(*kind).is_some())
        .collect::<Vec<_>>();
        if !roots.is_empty() {
            separate(f)?;
            writeln!(f, "schema {{")?;
            for kind in roots {
                let field = match kind {
                    RootOperationKind::Query => "query",
                    RootOperationKind::Mutation => "mutation",
                    RootOperationKind::Subscription => "subscription",
                };
                writeln!(f, "  {}: {}", field, kind.canonical_type_name())?;
            }
            writeln!(f, "}}")?;
        }

        for definition in self.schema.types() {
            if self.is_client() && !definition.is_accessible() {
                continue;
            }
            separate(f)?;
            self.write_type(f, definition)?;
        }

        Ok(())
    }
}
