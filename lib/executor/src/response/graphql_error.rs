use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::response::value::Value;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<GraphQLErrorLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<GraphQLErrorPathSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl From<String> for GraphQLError {
    fn from(message: String) -> Self {
        GraphQLError {
            message,
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

impl From<&str> for GraphQLError {
    fn from(message: &str) -> Self {
        message.to_string().into()
    }
}

impl GraphQLError {
    pub fn with_path(mut self, path: Vec<GraphQLErrorPathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    /// Sets `extensions.<key>`, keeping whatever extensions the error already carries.
    pub fn with_extension(mut self, key: &str, value: Value) -> Self {
        let extensions = self
            .extensions
            .get_or_insert_with(|| Value::Object(Vec::new()));
        if !extensions.is_object() {
            *extensions = Value::Object(Vec::new());
        }
        extensions.insert(key, value);
        self
    }

    pub fn with_code(self, code: &str) -> Self {
        self.with_extension("code", Value::string(code))
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.get("code"))
            .and_then(Value::as_str)
    }

    /// Whether the error is reported at `path` or anywhere above or below it.
    pub fn touches_path(&self, path: &[GraphQLErrorPathSegment]) -> bool {
        let Some(own) = &self.path else {
            return false;
        };
        let shared = own.len().min(path.len());
        own[..shared] == path[..shared]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphQLErrorLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GraphQLErrorPathSegment {
    String(String),
    Index(usize),
}

impl fmt::Display for GraphQLErrorPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphQLErrorPathSegment::String(key) => write!(f, "{}", key),
            GraphQLErrorPathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for GraphQLErrorPathSegment {
    fn from(key: &str) -> Self {
        GraphQLErrorPathSegment::String(key.to_string())
    }
}

impl From<usize> for GraphQLErrorPathSegment {
    fn from(index: usize) -> Self {
        GraphQLErrorPathSegment::Index(index)
    }
}

impl Serialize for GraphQLErrorPathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            GraphQLErrorPathSegment::String(key) => serializer.serialize_str(key),
            GraphQLErrorPathSegment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl<'de> Deserialize<'de> for GraphQLErrorPathSegment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PathSegmentVisitor;

        impl<'de> de::Visitor<'de> for PathSegmentVisitor {
            type Value = GraphQLErrorPathSegment;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or an integer for a GraphQL path segment")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(GraphQLErrorPathSegment::String(value.to_owned()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(GraphQLErrorPathSegment::String(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(GraphQLErrorPathSegment::Index(value as usize))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value < 0 {
                    return Err(E::custom(format!(
                        "path segment must be a non-negative integer, but got {}",
                        value
                    )));
                }
                Ok(GraphQLErrorPathSegment::Index(value as usize))
            }
        }

        deserializer.deserialize_any(PathSegmentVisitor)
    }
}
