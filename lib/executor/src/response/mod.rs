pub mod error_normalization;
pub mod graphql_error;
pub mod merge;
pub mod source_response;
pub mod value;
