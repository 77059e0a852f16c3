use std::fmt::{self, Display};

use graphql_parser::schema::Type;

/// A field, argument or input-field type.
///
/// `SemanticNonNull` marks a position that is never null unless an error was raised for it.
/// It renders as a nullable type in SDL; the position is carried by `@semanticNonNull(levels:)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
    SemanticNonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn semantic_non_null(inner: TypeRef) -> Self {
        TypeRef::SemanticNonNull(Box::new(inner))
    }

    /// The innermost named type.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) | TypeRef::SemanticNonNull(inner) => {
                inner.named_type()
            }
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// The type with its outermost nullability wrapper removed.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) | TypeRef::SemanticNonNull(inner) => inner.as_ref(),
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), TypeRef::List(_))
    }

    /// The item type when this is a (possibly non-null) list.
    pub fn list_item(&self) -> Option<&TypeRef> {
        match self.nullable() {
            TypeRef::List(item) => Some(item.as_ref()),
            _ => None,
        }
    }

    pub fn list_depth(&self) -> usize {
        match self {
            TypeRef::Named(_) => 0,
            TypeRef::List(inner) => 1 + inner.list_depth(),
            TypeRef::NonNull(inner) | TypeRef::SemanticNonNull(inner) => inner.list_depth(),
        }
    }

    pub fn from_ast(ty: &Type<'_, String>) -> Self {
        match ty {
            Type::NamedType(name) => TypeRef::Named(name.clone()),
            Type::ListType(inner) => TypeRef::list(TypeRef::from_ast(inner)),
            Type::NonNullType(inner) => TypeRef::non_null(TypeRef::from_ast(inner)),
        }
    }

    /// Marks the nullable positions addressed by `levels` as semantically non-null.
    /// Level 0 is the value itself, level 1 its list items, and so on.
    pub fn with_semantic_non_null(self, levels: &[usize]) -> TypeRef {
        self.apply_levels(0, levels)
    }

    fn apply_levels(self, level: usize, levels: &[usize]) -> TypeRef {
        match self {
            TypeRef::NonNull(inner) => TypeRef::non_null((*inner).apply_to_inner(level, levels)),
            TypeRef::SemanticNonNull(inner) => {
                TypeRef::semantic_non_null((*inner).apply_to_inner(level, levels))
            }
            nullable => {
                let inner = nullable.apply_to_inner(level, levels);
                if levels.contains(&level) {
                    TypeRef::semantic_non_null(inner)
                } else {
                    inner
                }
            }
        }
    }

    fn apply_to_inner(self, level: usize, levels: &[usize]) -> TypeRef {
        match self {
            TypeRef::List(item) => TypeRef::list((*item).apply_levels(level + 1, levels)),
            other => other,
        }
    }

    /// Positions carrying `SemanticNonNull`, in the numbering of [`TypeRef::with_semantic_non_null`].
    pub fn semantic_non_null_levels(&self) -> Vec<usize> {
        let mut levels = Vec::new();
        let mut current = self;
        let mut level = 0;
        loop {
            match current {
                TypeRef::SemanticNonNull(inner) => {
                    levels.push(level);
                    current = inner.as_ref();
                }
                TypeRef::NonNull(inner) => current = inner.as_ref(),
                TypeRef::List(item) => {
                    level += 1;
                    current = item.as_ref();
                }
                TypeRef::Named(_) => return levels,
            }
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
            TypeRef::SemanticNonNull(inner) => write!(f, "{}", inner),
        }
    }
}
