use graphql_parser::query::Document;

use crate::error::ExtractionError;

#[inline]
pub fn parse_operation(operation: &str) -> Result<Document<'static, String>, ExtractionError> {
    graphql_parser::parse_query::<String>(operation)
        .map(|document| document.into_static())
        .map_err(|err| ExtractionError::Parse(err.to_string()))
}
