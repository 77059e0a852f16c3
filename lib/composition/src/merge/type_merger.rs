use crate::type_ref::TypeRef;

/// Merges the types two source schemas give the same output field, keeping the weakest one a
/// client can rely on: nullable beats semantically non-null, which beats non-null.
/// Returns `None` when the shapes differ (list against non-list, different named types).
pub fn merge_output_type(source: &TypeRef, target: &TypeRef) -> Option<TypeRef> {
    use TypeRef::*;

    if source == target {
        return Some(source.clone());
    }

    match (source, target) {
        (NonNull(a), NonNull(b)) => merge_output_type(a, b).map(TypeRef::non_null),
        (SemanticNonNull(a), SemanticNonNull(b))
        | (NonNull(a), SemanticNonNull(b))
        | (SemanticNonNull(a), NonNull(b)) => {
            merge_output_type(a, b).map(TypeRef::semantic_non_null)
        }
        (NonNull(a) | SemanticNonNull(a), other) => merge_output_type(a, other),
        (other, NonNull(b) | SemanticNonNull(b)) => merge_output_type(other, b),
        (List(a), List(b)) => merge_output_type(a, b).map(TypeRef::list),
        _ => None,
    }
}

/// Merges the types two source schemas give the same argument or input field, keeping the
/// strongest one so that every source schema accepts what a client sends. Semantic non-null
/// has no meaning on inputs and counts as nullable.
pub fn merge_input_type(source: &TypeRef, target: &TypeRef) -> Option<TypeRef> {
    use TypeRef::*;

    if source == target {
        return Some(source.clone());
    }

    match (source, target) {
        (SemanticNonNull(a), other) => merge_input_type(a, other),
        (other, SemanticNonNull(b)) => merge_input_type(other, b),
        (NonNull(a), NonNull(b)) => merge_input_type(a, b).map(TypeRef::non_null),
        (NonNull(a), other) | (other, NonNull(a)) => merge_input_type(a, other).map(TypeRef::non_null),
        (List(a), List(b)) => merge_input_type(a, b).map(TypeRef::list),
        _ => None,
    }
}
