use hive_fusion_composition::SchemaCoordinate;

/// Hard failures while turning a client operation into sub-queries. Any of them rejects the
/// whole request before a source schema is contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Failed to parse the operation: {0}")]
    Parse(String),

    #[error("An operation was expected, but none were present.")]
    OperationNotFound,

    #[error("Multiple operations found, an operation name is required.")]
    MultipleOperations,

    #[error("Specified operation '{operation_name}' not found.")]
    SpecifiedOperationNotFound { operation_name: String },

    #[error("'{kind}' operations are not supported.")]
    UnsupportedOperationKind { kind: &'static str },

    #[error("The schema does not define a root type for '{kind}' operations.")]
    RootTypeNotFound { kind: &'static str },

    #[error("Type '{type_name}' not found.")]
    UnknownType { type_name: String },

    #[error("Field '{coordinate}' at '{path}' not found.")]
    UnknownField {
        coordinate: SchemaCoordinate,
        path: String,
    },

    #[error("Field '{coordinate}' at '{path}' cannot be resolved by any source schema in reach.")]
    UnresolvableField {
        coordinate: SchemaCoordinate,
        path: String,
    },

    #[error("Fragment definition for '{fragment_name}' not found.")]
    UnknownFragment { fragment_name: String },

    #[error("Fragment cycle detected: {}.", .cycle.join(" -> "))]
    FragmentCycle { cycle: Vec<String> },

    #[error("Variable '${variable_name}' is not defined by the operation.")]
    UndefinedVariable { variable_name: String },
}
