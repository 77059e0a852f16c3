use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::executors::common::{SourceSchemaExecutor, SourceSchemaRequest};
use crate::executors::error::ExecutorError;
use crate::response::{source_response::SourceSchemaResponse, value::Value};

/// What an in-process source schema receives.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRequest {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: Value,
}

type LocalHandler = Box<
    dyn Fn(LocalRequest) -> BoxFuture<'static, Result<SourceSchemaResponse, ExecutorError>>
        + Send
        + Sync,
>;

/// Resolves sub-queries in process, with a handler instead of a remote service.
pub struct LocalSourceSchemaExecutor {
    handler: LocalHandler,
}

impl LocalSourceSchemaExecutor {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(LocalRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SourceSchemaResponse, ExecutorError>> + Send + 'static,
    {
        LocalSourceSchemaExecutor {
            handler: Box::new(move |request| handler(request).boxed()),
        }
    }

    /// An executor answering every sub-query with the same response.
    pub fn fixed(response: SourceSchemaResponse) -> Self {
        Self::new(move |_| {
            let response = response.clone();
            async move { Ok(response) }
        })
    }
}

#[async_trait]
impl SourceSchemaExecutor for LocalSourceSchemaExecutor {
    async fn execute<'a>(
        &self,
        request: SourceSchemaRequest<'a>,
    ) -> Result<SourceSchemaResponse, ExecutorError> {
        let request = LocalRequest {
            query: request.query.to_string(),
            operation_name: request.operation_name.map(str::to_string),
            variables: request.variables_as_value(),
        };
        (self.handler)(request).await
    }
}
