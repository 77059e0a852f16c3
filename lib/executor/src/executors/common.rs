use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    executors::error::ExecutorError,
    response::{source_response::SourceSchemaResponse, value::Value},
};

/// Sends one sub-query to one source schema.
#[async_trait]
pub trait SourceSchemaExecutor {
    async fn execute<'a>(
        &self,
        request: SourceSchemaRequest<'a>,
    ) -> Result<SourceSchemaResponse, ExecutorError>;

    fn to_boxed_arc<'a>(self) -> Arc<Box<dyn SourceSchemaExecutor + Send + Sync + 'a>>
    where
        Self: Sized + Send + Sync + 'a,
    {
        Arc::new(Box::new(self))
    }
}

pub type SourceSchemaExecutorType = dyn SourceSchemaExecutor + Send + Sync;

pub type SourceSchemaExecutorBoxedArc = Arc<Box<SourceSchemaExecutorType>>;

#[derive(Debug, Clone)]
pub struct SourceSchemaRequest<'a> {
    pub query: &'a str,
    pub operation_name: Option<&'a str>,
    /// Only the variables the sub-query declares, in declaration order.
    pub variables: Vec<(&'a str, &'a Value)>,
}

impl SourceSchemaRequest<'_> {
    pub fn variables_as_value(&self) -> Value {
        Value::Object(
            self.variables
                .iter()
                .map(|(name, value)| (name.to_string(), (*value).clone()))
                .collect(),
        )
    }
}
