pub mod conditions;
pub mod response;
