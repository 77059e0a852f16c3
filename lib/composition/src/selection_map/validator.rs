use super::error::SelectionMapError;
use super::{PathSelection, SelectedObjectValue, SelectedValue, SelectedValueEntry, SelectionMap};
use crate::coordinate::SchemaCoordinate;
use crate::schema::{is_built_in_scalar, TypeDefinition, TypeKind};
use crate::type_ref::TypeRef;

/// Read access to the types a selection map is resolved against.
pub trait SchemaView {
    fn type_definition(&self, name: &str) -> Option<&TypeDefinition>;

    /// Object types that implement an interface or belong to a union, in definition order.
    fn possible_types(&self, abstract_type: &str) -> Vec<&str>;

    fn is_leaf_type(&self, name: &str) -> bool {
        is_built_in_scalar(name)
            || self
                .type_definition(name)
                .is_some_and(|definition| definition.kind.is_leaf())
    }

    fn is_possible_type(&self, parent: &str, candidate: &str) -> bool {
        parent == candidate || self.possible_types(parent).contains(&candidate)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionMapValidation {
    pub errors: Vec<SelectionMapError>,
    /// Every field the map resolves, in walk order.
    pub selected_fields: Vec<SchemaCoordinate>,
}

impl SelectionMapValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolves `map` against `output_type` and, when given, checks that the selected value
/// fits `input_type`.
pub fn validate_selection_map(
    map: &SelectionMap,
    input_type: Option<&TypeRef>,
    output_type: &str,
    schema: &dyn SchemaView,
) -> SelectionMapValidation {
    let mut validator = Validator {
        schema,
        result: SelectionMapValidation::default(),
    };
    validator.validate_value(&map.value, input_type, output_type, "");
    validator.result
}

struct Validator<'a> {
    schema: &'a dyn SchemaView,
    result: SelectionMapValidation,
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

impl Validator<'_> {
    fn error(&mut self, error: SelectionMapError) {
        self.result.errors.push(error);
    }

    fn validate_value(
        &mut self,
        value: &SelectedValue,
        input_type: Option<&TypeRef>,
        output_type: &str,
        prefix: &str,
    ) {
        for entry in &value.entries {
            self.validate_entry(entry, input_type, output_type, prefix);
        }
    }

    fn check_type_condition(&mut self, parent: &str, condition: &str, path: &str) -> bool {
        if self.schema.type_definition(condition).is_some()
            && self.schema.is_possible_type(parent, condition)
        {
            return true;
        }
        self.error(SelectionMapError::InvalidTypeCondition {
            path: path.to_string(),
            type_condition: condition.to_string(),
            parent_type: parent.to_string(),
        });
        false
    }

    fn validate_entry(
        &mut self,
        entry: &SelectedValueEntry,
        input_type: Option<&TypeRef>,
        output_type: &str,
        prefix: &str,
    ) {
        let (path, selection) = match entry {
            SelectedValueEntry::Object(object) => {
                self.validate_object(object, input_type, output_type, prefix);
                return;
            }
            SelectedValueEntry::Path { path, selection } => (path, selection),
        };

        let mut current_type = output_type.to_string();
        if let Some(condition) = &path.type_condition {
            if !self.check_type_condition(&current_type, condition, prefix) {
                return;
            }
            current_type = condition.clone();
        }

        let mut current_path = prefix.to_string();
        let mut list_depth = 0;
        for segment in path.segment.iter() {
            current_path = join_path(&current_path, &segment.field);
            let coordinate = SchemaCoordinate::member(&current_type, &segment.field);
            let field_type = match self
                .schema
                .type_definition(&current_type)
                .and_then(|definition| definition.field(&segment.field))
            {
                Some(field) => field.ty.clone(),
                None => {
                    self.error(SelectionMapError::UnresolvedField {
                        path: current_path,
                        coordinate,
                    });
                    return;
                }
            };
            self.result.selected_fields.push(coordinate);
            list_depth += field_type.list_depth();
            current_type = field_type.named_type().to_string();

            if let Some(condition) = &segment.type_condition {
                if !self.check_type_condition(&current_type, condition, &current_path) {
                    return;
                }
                current_type = condition.clone();
            }

            if segment.next.is_some() && self.schema.is_leaf_type(&current_type) {
                self.error(SelectionMapError::LeafRequiresNoSelection {
                    path: current_path,
                    type_name: current_type,
                });
                return;
            }
        }

        let is_leaf = self.schema.is_leaf_type(&current_type);
        match selection {
            None => self.validate_terminal(input_type, &current_type, list_depth, &current_path),
            Some(_) if is_leaf => self.error(SelectionMapError::LeafRequiresNoSelection {
                path: current_path,
                type_name: current_type,
            }),
            Some(PathSelection::Object(object)) => {
                if list_depth > 0 {
                    self.error(SelectionMapError::ListMismatch { path: current_path });
                    return;
                }
                self.validate_object(object, input_type, &current_type, &current_path);
            }
            Some(PathSelection::List(inner)) => {
                if list_depth == 0 {
                    self.error(SelectionMapError::ListMismatch { path: current_path });
                    return;
                }
                let item_input = match input_type {
                    Some(input) => match input.list_item() {
                        Some(item) => Some(item),
                        None => {
                            self.error(SelectionMapError::ListMismatch { path: current_path });
                            return;
                        }
                    },
                    None => None,
                };
                self.validate_value(inner, item_input, &current_type, &current_path);
            }
        }
    }

    /// A path without nested selection: the selected value must fit the input type directly.
    fn validate_terminal(
        &mut self,
        input_type: Option<&TypeRef>,
        output_type: &str,
        output_list_depth: usize,
        path: &str,
    ) {
        let is_leaf = self.schema.is_leaf_type(output_type);
        let Some(input_type) = input_type else {
            if !is_leaf {
                self.error(SelectionMapError::SelectionRequired {
                    path: path.to_string(),
                    type_name: output_type.to_string(),
                });
            }
            return;
        };

        if input_type.list_depth() != output_list_depth {
            self.error(SelectionMapError::ListMismatch {
                path: path.to_string(),
            });
            return;
        }

        let input_name = input_type.named_type();
        if is_leaf {
            if input_name != output_type {
                self.error(SelectionMapError::TypeMismatch {
                    path: path.to_string(),
                    expected: input_name.to_string(),
                    found: output_type.to_string(),
                });
            }
            return;
        }

        // A composite output feeding an input object: the input fields are taken from the
        // output fields of the same name.
        let input_fields = match self.schema.type_definition(input_name) {
            Some(definition) if definition.kind == TypeKind::InputObject => {
                definition.input_fields.values().cloned().collect::<Vec<_>>()
            }
            _ => {
                self.error(SelectionMapError::TypeMismatch {
                    path: path.to_string(),
                    expected: input_name.to_string(),
                    found: output_type.to_string(),
                });
                return;
            }
        };

        for input_field in input_fields {
            let output_field = self
                .schema
                .type_definition(output_type)
                .and_then(|definition| definition.field(&input_field.name))
                .map(|field| field.ty.clone());
            let field_path = join_path(path, &input_field.name);
            match output_field {
                Some(output_field_type) => {
                    self.result
                        .selected_fields
                        .push(SchemaCoordinate::member(output_type, &input_field.name));
                    self.validate_terminal(
                        Some(&input_field.ty),
                        output_field_type.named_type(),
                        output_field_type.list_depth(),
                        &field_path,
                    );
                }
                None if input_field.is_required() => {
                    self.error(SelectionMapError::MissingRequiredInputField {
                        path: field_path,
                        coordinate: SchemaCoordinate::member(input_name, &input_field.name),
                    });
                }
                None => {}
            }
        }
    }

    fn validate_object(
        &mut self,
        object: &SelectedObjectValue,
        input_type: Option<&TypeRef>,
        output_type: &str,
        prefix: &str,
    ) {
        let input_definition = match input_type {
            Some(input_type) => {
                if input_type.is_list() {
                    self.error(SelectionMapError::ListMismatch {
                        path: prefix.to_string(),
                    });
                    return;
                }
                match self.schema.type_definition(input_type.named_type()) {
                    Some(definition) if definition.kind == TypeKind::InputObject => {
                        Some(definition.clone())
                    }
                    _ => {
                        self.error(SelectionMapError::TypeMismatch {
                            path: prefix.to_string(),
                            expected: input_type.named_type().to_string(),
                            found: "an object".to_string(),
                        });
                        return;
                    }
                }
            }
            None => None,
        };

        for field in &object.fields {
            let field_input = match &input_definition {
                Some(definition) => match definition.input_fields.get(&field.name) {
                    Some(input_field) => Some(input_field.ty.clone()),
                    None => {
                        self.error(SelectionMapError::UnresolvedField {
                            path: join_path(prefix, &field.name),
                            coordinate: SchemaCoordinate::member(&definition.name, &field.name),
                        });
                        continue;
                    }
                },
                None => None,
            };

            match &field.value {
                Some(value) => {
                    self.validate_value(value, field_input.as_ref(), output_type, prefix);
                }
                None => {
                    let shorthand = SelectedValue {
                        entries: vec![SelectedValueEntry::Path {
                            path: super::Path {
                                type_condition: None,
                                segment: super::PathSegment {
                                    field: field.name.clone(),
                                    type_condition: None,
                                    next: None,
                                },
                            },
                            selection: None,
                        }],
                    };
                    self.validate_value(&shorthand, field_input.as_ref(), output_type, prefix);
                }
            }
        }

        if let Some(definition) = &input_definition {
            for input_field in definition.input_fields.values() {
                let provided = object.fields.iter().any(|field| field.name == input_field.name);
                if !provided && input_field.is_required() {
                    self.error(SelectionMapError::MissingRequiredInputField {
                        path: prefix.to_string(),
                        coordinate: SchemaCoordinate::member(&definition.name, &input_field.name),
                    });
                }
            }
        }
    }
}
