use core::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};

use crate::{
    executors::error::ExecutorError,
    response::{graphql_error::GraphQLError, value::Value},
};

/// The body a source schema answered a sub-query with.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SourceSchemaResponse {
    pub data: Value,
    pub errors: Option<Vec<GraphQLError>>,
    pub extensions: Option<Value>,
}

impl<'de> de::Deserialize<'de> for SourceSchemaResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SourceSchemaResponseVisitor;

        impl<'de> Visitor<'de> for SourceSchemaResponseVisitor {
            type Value = SourceSchemaResponse;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter
                    .write_str("a GraphQL response object with data, errors, and extensions fields")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut data = None;
                let mut errors = None;
                let mut extensions = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "data" => {
                            if data.is_some() {
                                return Err(de::Error::duplicate_field("data"));
                            }
                            data = Some(map.next_value()?);
                        }
                        "errors" => {
                            if errors.is_some() {
                                return Err(de::Error::duplicate_field("errors"));
                            }
                            errors = Some(map.next_value::<Option<Vec<GraphQLError>>>()?);
                        }
                        "extensions" => {
                            if extensions.is_some() {
                                return Err(de::Error::duplicate_field("extensions"));
                            }
                            extensions = Some(map.next_value()?);
                        }
                        _ => {
                            let _ = map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                // `data` may be missing or null when the source schema only reports errors.
                Ok(SourceSchemaResponse {
                    data: data.unwrap_or(Value::Null),
                    errors: errors.flatten(),
                    extensions,
                })
            }
        }

        deserializer.deserialize_map(SourceSchemaResponseVisitor)
    }
}

impl SourceSchemaResponse {
    pub fn from_data(data: Value) -> Self {
        SourceSchemaResponse {
            data,
            ..Default::default()
        }
    }

    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        SourceSchemaResponse {
            errors: Some(errors),
            ..Default::default()
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExecutorError> {
        sonic_rs::from_slice(bytes)
            .map_err(|err| ExecutorError::ResponseDeserializationFailure(err.to_string()))
    }

    pub fn errors(&self) -> &[GraphQLError] {
        self.errors.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::SourceSchemaResponse;

    #[test]
    fn deserializes_data_errors_and_extensions() {
        let response = SourceSchemaResponse::from_bytes(
            br#"{
              "data": { "product": { "id": "1", "price": null } },
              "errors": [
                {
                  "message": "price is unavailable",
                  "locations": [{ "line": 1, "column": 22 }],
                  "path": ["product", "price"]
                }
              ],
              "extensions": { "cost": 3 },
              "unknown": "ignored"
            }"#,
        )
        .unwrap();

        insta::assert_snapshot!(sonic_rs::to_string_pretty(&response.data).unwrap(), @r###"
        {
          "product": {
            "id": "1",
            "price": null
          }
        }
        "###);
        assert_eq!(response.errors().len(), 1);
        assert_eq!(response.errors()[0].message, "price is unavailable");
        assert!(response.extensions.is_some());
    }

    #[test]
    fn accepts_null_data_and_null_errors() {
        let response = SourceSchemaResponse::from_bytes(br#"{"data":null,"errors":null}"#).unwrap();
        assert!(response.data.is_null());
        assert!(response.errors().is_empty());
    }

    #[test]
    fn rejects_non_objects() {
        assert!(SourceSchemaResponse::from_bytes(b"[1,2]").is_err());
        assert!(SourceSchemaResponse::from_bytes(b"<html>").is_err());
    }
}
