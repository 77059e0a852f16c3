use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::executors::common::{
    SourceSchemaExecutor, SourceSchemaExecutorBoxedArc, SourceSchemaRequest,
};
use crate::executors::error::ExecutorError;
use crate::response::source_response::SourceSchemaResponse;

/// Bounds every sub-dispatch of the wrapped executor by `timeout`.
pub struct TimeoutExecutor {
    pub timeout: Duration,
    pub executor: SourceSchemaExecutorBoxedArc,
}

impl TimeoutExecutor {
    pub fn new(timeout: Duration, executor: SourceSchemaExecutorBoxedArc) -> Self {
        Self { timeout, executor }
    }
}

#[async_trait]
impl SourceSchemaExecutor for TimeoutExecutor {
    async fn execute<'a>(
        &self,
        request: SourceSchemaRequest<'a>,
    ) -> Result<SourceSchemaResponse, ExecutorError> {
        let execution = self.executor.execute(request);
        match tokio::time::timeout(self.timeout, execution).await {
            Ok(response) => response,
            Err(_) => {
                warn!(timeout = ?self.timeout, "sub-dispatch timed out");
                Err(ExecutorError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::executors::{
        common::{SourceSchemaExecutor, SourceSchemaRequest},
        error::ExecutorError,
        local::LocalSourceSchemaExecutor,
        timeout::TimeoutExecutor,
    };
    use crate::response::{source_response::SourceSchemaResponse, value::Value};

    fn request() -> SourceSchemaRequest<'static> {
        SourceSchemaRequest {
            query: "{ a }",
            operation_name: None,
            variables: Vec::new(),
        }
    }

    fn delayed(delay: Duration) -> LocalSourceSchemaExecutor {
        LocalSourceSchemaExecutor::new(move |_| async move {
            tokio::time::sleep(delay).await;
            Ok(SourceSchemaResponse::from_data(Value::object([("a", Value::I64(1))])))
        })
    }

    #[tokio::test]
    async fn fails_slow_dispatches() {
        let executor = TimeoutExecutor::new(
            Duration::from_millis(50),
            delayed(Duration::from_secs(5)).to_boxed_arc(),
        );

        assert_eq!(
            executor.execute(request()).await,
            Err(ExecutorError::Timeout(Duration::from_millis(50)))
        );
    }

    #[tokio::test]
    async fn passes_fast_dispatches_through() {
        let executor = TimeoutExecutor::new(
            Duration::from_secs(1),
            delayed(Duration::from_millis(10)).to_boxed_arc(),
        );

        let response = executor.execute(request()).await.unwrap();
        assert_eq!(response.data.to_json(), r#"{"a":1}"#);
    }
}
