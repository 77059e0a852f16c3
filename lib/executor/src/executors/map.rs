use std::{collections::HashMap, sync::Arc};

use hive_fusion_config::FusionConfig;
use hyper_util::{
    client::legacy::Client,
    rt::{TokioExecutor, TokioTimer},
};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::executors::{
    common::{SourceSchemaExecutor, SourceSchemaExecutorBoxedArc, SourceSchemaRequest},
    error::ExecutorError,
    http::{HttpClient, HttpSourceSchemaExecutor},
    timeout::TimeoutExecutor,
};
use crate::response::source_response::SourceSchemaResponse;

/// The executors of every reachable source schema, by source schema name. Read-only once
/// built, so one map serves all concurrent requests.
#[derive(Default)]
pub struct SourceSchemaExecutorMap {
    inner: HashMap<String, SourceSchemaExecutorBoxedArc>,
}

impl SourceSchemaExecutorMap {
    pub fn new() -> Self {
        SourceSchemaExecutorMap {
            inner: HashMap::new(),
        }
    }

    pub async fn execute<'a>(
        &self,
        source_schema: &str,
        request: SourceSchemaRequest<'a>,
    ) -> Result<SourceSchemaResponse, ExecutorError> {
        match self.inner.get(source_schema) {
            Some(executor) => executor.execute(request).await,
            None => Err(ExecutorError::SourceSchemaNotFound(
                source_schema.to_string(),
            )),
        }
    }

    pub fn contains(&self, source_schema: &str) -> bool {
        self.inner.contains_key(source_schema)
    }

    pub fn insert_boxed_arc(&mut self, source_schema: String, boxed_arc: SourceSchemaExecutorBoxedArc) {
        self.inner.insert(source_schema, boxed_arc);
    }

    pub fn with_executor(
        mut self,
        source_schema: &str,
        executor: impl SourceSchemaExecutor + Send + Sync + 'static,
    ) -> Self {
        self.insert_boxed_arc(source_schema.to_string(), executor.to_boxed_arc());
        self
    }

    /// One HTTP executor per source schema with an endpoint, sharing a single connection
    /// pool. Source schemas served from the same origin share one connection limit; each
    /// keeps its own timeout.
    #[instrument(level = "trace", skip_all)]
    pub fn from_config(config: &FusionConfig) -> Result<Self, ExecutorError> {
        let traffic_shaping = &config.traffic_shaping;
        let http_client: Arc<HttpClient> = Arc::new(
            Client::builder(TokioExecutor::new())
                .pool_timer(TokioTimer::new())
                .pool_idle_timeout(traffic_shaping.pool_idle_timeout)
                .pool_max_idle_per_host(traffic_shaping.max_connections_per_host)
                .build_http(),
        );

        let mut map = SourceSchemaExecutorMap::new();
        let mut semaphores_by_origin: HashMap<String, Arc<Semaphore>> = HashMap::new();
        for (name, source) in &config.source_schemas {
            let Some(endpoint) = &source.endpoint else {
                debug!(source_schema = %name, "no endpoint configured, skipping executor");
                continue;
            };
            let semaphore = origin_semaphore(
                &mut semaphores_by_origin,
                endpoint,
                traffic_shaping.max_connections_per_host,
            );
            let http_executor =
                HttpSourceSchemaExecutor::new(endpoint, http_client.clone(), semaphore)?;
            let executor = TimeoutExecutor::new(
                config.timeout_for(name),
                http_executor.to_boxed_arc(),
            );
            map.insert_boxed_arc(name.clone(), executor.to_boxed_arc());
        }

        Ok(map)
    }
}

/// `scheme://host:port` of an endpoint. Endpoints that do not parse are their own origin and
/// fail later, when the executor is built.
fn endpoint_origin(endpoint: &str) -> String {
    match endpoint.parse::<http::Uri>() {
        Ok(uri) => format!(
            "{}://{}",
            uri.scheme_str().unwrap_or("http"),
            uri.authority().map(|authority| authority.as_str()).unwrap_or_default()
        ),
        Err(_) => endpoint.to_string(),
    }
}

fn origin_semaphore(
    semaphores_by_origin: &mut HashMap<String, Arc<Semaphore>>,
    endpoint: &str,
    max_connections: usize,
) -> Arc<Semaphore> {
    semaphores_by_origin
        .entry(endpoint_origin(endpoint))
        .or_insert_with(|| Arc::new(Semaphore::new(max_connections)))
        .clone()
}

#[cfg(test)]
mod tests {
    use hive_fusion_config::parse_yaml_config;

    use super::*;
    use crate::executors::local::LocalSourceSchemaExecutor;
    use crate::response::value::Value;

    fn request() -> SourceSchemaRequest<'static> {
        SourceSchemaRequest {
            query: "{ a }",
            operation_name: None,
            variables: Vec::new(),
        }
    }

    #[tokio::test]
    async fn fails_fast_on_unknown_source_schemas() {
        let map = SourceSchemaExecutorMap::new().with_executor(
            "catalog",
            LocalSourceSchemaExecutor::fixed(SourceSchemaResponse::from_data(Value::Null)),
        );

        assert!(map.execute("catalog", request()).await.is_ok());
        assert_eq!(
            map.execute("pricing", request()).await,
            Err(ExecutorError::SourceSchemaNotFound("pricing".to_string()))
        );
    }

    #[tokio::test]
    async fn builds_executors_for_configured_endpoints() {
        let config = parse_yaml_config(
            r#"
source_schemas:
  catalog:
    schema_path: ./catalog.graphql
    endpoint: http://localhost:4001/graphql
  pricing:
    schema_path: ./pricing.graphql
"#
            .to_string(),
        )
        .unwrap();

        let map = SourceSchemaExecutorMap::from_config(&config).unwrap();
        assert!(map.contains("catalog"));
        assert!(!map.contains("pricing"));
    }

    #[test]
    fn source_schemas_on_one_origin_share_a_connection_limit() {
        let mut semaphores = HashMap::new();
        let catalog = origin_semaphore(&mut semaphores, "http://localhost:4001/catalog", 8);
        let pricing = origin_semaphore(&mut semaphores, "http://localhost:4001/pricing", 8);
        let reviews = origin_semaphore(&mut semaphores, "http://localhost:4002/graphql", 8);

        assert!(Arc::ptr_eq(&catalog, &pricing));
        assert!(!Arc::ptr_eq(&catalog, &reviews));
        assert_eq!(semaphores.len(), 2);
        assert_eq!(catalog.available_permits(), 8);
    }

    #[test]
    fn origin_ignores_the_path() {
        assert_eq!(
            endpoint_origin("https://api.example.com:8443/graphql?x=1"),
            "https://api.example.com:8443"
        );
        assert_eq!(endpoint_origin("not a uri"), "not a uri");
    }
}
