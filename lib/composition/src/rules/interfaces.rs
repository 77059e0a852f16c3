use super::{MemberEvent, MemberKind, Rule, RuleContext};
use crate::coordinate::SchemaCoordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::selection_map::SchemaView;

pub(super) const RULE: Rule = Rule {
    name: "interface_implementations",
    events: &[MemberKind::ObjectType, MemberKind::InterfaceType],
    check,
};

/// Accessible interface fields must be implemented by accessible fields.
fn check(event: &MemberEvent<'_>, context: &RuleContext<'_>) -> Vec<Diagnostic> {
    let MemberEvent::Type(definition) = event else {
        return Vec::new();
    };
    if !definition.is_accessible() {
        return Vec::new();
    }

    let mut diagnostics = Vec::new();
    for interface_name in &definition.interfaces {
        let Some(interface) = context.schema.type_definition(interface_name) else {
            continue;
        };
        if !interface.is_accessible() {
            continue;
        }

        for interface_field in interface.fields.values().filter(|field| field.is_accessible()) {
            let implementation_coordinate =
                SchemaCoordinate::member(&definition.name, &interface_field.name);
            let interface_coordinate = SchemaCoordinate::member(&interface.name, &interface_field.name);

            match definition.fields.get(&interface_field.name) {
                None => diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::InterfaceFieldNotImplemented,
                        format!(
                            "\"{}\" implements \"{}\" but does not define the field \"{}\"",
                            definition.name, interface.name, interface_field.name
                        ),
                    )
                    .with_coordinate(implementation_coordinate)
                    .with_coordinate(interface_coordinate),
                ),
                Some(implementation) if !implementation.is_accessible() => diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::ImplementedByInaccessible,
                        format!(
                            "the field \"{}\" is inaccessible but implements the accessible field \"{}\"",
                            implementation_coordinate, interface_coordinate
                        ),
                    )
                    .with_coordinate(implementation_coordinate)
                    .with_coordinate(interface_coordinate),
                ),
                Some(_) => {}
            }
        }
    }

    diagnostics
}
