use std::sync::Arc;

use async_trait::async_trait;
use bytes::BufMut;
use bytes::BytesMut;
use http::HeaderMap;
use http::HeaderValue;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::{body::Bytes, Version};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::executors::common::{SourceSchemaExecutor, SourceSchemaRequest};
use crate::executors::error::ExecutorError;
use crate::response::source_response::SourceSchemaResponse;

pub type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// Posts sub-queries as `{"query", "operationName", "variables"}` JSON documents.
#[derive(Debug)]
pub struct HttpSourceSchemaExecutor {
    pub endpoint: http::Uri,
    pub http_client: Arc<HttpClient>,
    pub header_map: HeaderMap,
    pub semaphore: Arc<Semaphore>,
}

const FIRST_QUOTE_STR: &[u8] = b"{\"query\":";
const OPERATION_NAME_STR: &[u8] = b",\"operationName\":";
const FIRST_VARIABLE_STR: &[u8] = b",\"variables\":{";

impl HttpSourceSchemaExecutor {
    pub fn new(
        endpoint: &str,
        http_client: Arc<HttpClient>,
        semaphore: Arc<Semaphore>,
    ) -> Result<Self, ExecutorError> {
        let endpoint = endpoint.parse::<http::Uri>().map_err(|e| {
            ExecutorError::EndpointParseFailure(endpoint.to_string(), e.to_string())
        })?;

        let mut header_map = HeaderMap::new();
        header_map.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        header_map.insert(
            http::header::ACCEPT,
            HeaderValue::from_static("application/graphql-response+json, application/json"),
        );
        header_map.insert(
            http::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        Ok(Self {
            endpoint,
            http_client,
            header_map,
            semaphore,
        })
    }

    fn build_body(&self, request: &SourceSchemaRequest<'_>) -> Result<Bytes, ExecutorError> {
        let mut body = BytesMut::with_capacity(request.query.len() + 64);
        body.put(FIRST_QUOTE_STR);
        write_json(&mut body, request.query, "query")?;
        if let Some(operation_name) = request.operation_name {
            body.put(OPERATION_NAME_STR);
            write_json(&mut body, operation_name, "operationName")?;
        }
        if !request.variables.is_empty() {
            body.put(FIRST_VARIABLE_STR);
            for (index, (name, value)) in request.variables.iter().enumerate() {
                if index > 0 {
                    body.put_u8(b',');
                }
                write_json(&mut body, name, name)?;
                body.put_u8(b':');
                write_json(&mut body, *value, name)?;
            }
            body.put_u8(b'}');
        }
        body.put_u8(b'}');
        Ok(body.freeze())
    }

    async fn send(&self, body: Bytes) -> Result<(http::StatusCode, Bytes), ExecutorError> {
        let mut req = hyper::Request::builder()
            .method(http::Method::POST)
            .uri(&self.endpoint)
            .version(Version::HTTP_11)
            .body(Full::new(body))
            .map_err(|e| {
                ExecutorError::RequestBuildFailure(self.endpoint.to_string(), e.to_string())
            })?;

        *req.headers_mut() = self.header_map.clone();

        let res = self.http_client.request(req).await.map_err(|e| {
            ExecutorError::RequestFailure(self.endpoint.to_string(), e.to_string())
        })?;
        let status = res.status();

        let bytes = res
            .into_body()
            .collect()
            .await
            .map_err(|e| ExecutorError::RequestFailure(self.endpoint.to_string(), e.to_string()))?
            .to_bytes();

        Ok((status, bytes))
    }
}

fn write_json<T: Serialize + ?Sized>(
    body: &mut BytesMut,
    value: &T,
    name: &str,
) -> Result<(), ExecutorError> {
    let json = sonic_rs::to_vec(value)
        .map_err(|e| ExecutorError::VariablesSerializationFailure(name.to_string(), e.to_string()))?;
    body.put_slice(&json);
    Ok(())
}

#[async_trait]
impl SourceSchemaExecutor for HttpSourceSchemaExecutor {
    #[instrument(level = "trace", skip_all, fields(endpoint = %self.endpoint))]
    async fn execute<'a>(
        &self,
        request: SourceSchemaRequest<'a>,
    ) -> Result<SourceSchemaResponse, ExecutorError> {
        let body = self.build_body(&request)?;

        let _permit = self.semaphore.acquire().await.map_err(|e| {
            ExecutorError::RequestFailure(self.endpoint.to_string(), e.to_string())
        })?;

        let (status, bytes) = self.send(body).await?;
        debug!(status = %status, bytes = bytes.len(), "source schema responded");

        SourceSchemaResponse::from_bytes(&bytes).map_err(|e| {
            if status.is_success() {
                e
            } else {
                ExecutorError::RequestFailure(
                    self.endpoint.to_string(),
                    format!("unexpected status {}", status),
                )
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hyper_util::{client::legacy::Client, rt::TokioExecutor};
    use tokio::sync::Semaphore;

    use super::*;
    use crate::response::value::Value;

    fn executor(endpoint: &str) -> HttpSourceSchemaExecutor {
        let client = Client::builder(TokioExecutor::new()).build_http();
        HttpSourceSchemaExecutor::new(endpoint, Arc::new(client), Arc::new(Semaphore::new(4)))
            .unwrap()
    }

    #[test]
    fn builds_graphql_over_http_body() {
        let id = Value::string("1");
        let request = SourceSchemaRequest {
            query: "query ($id: ID!) {\n  product(id: $id) {\n    \"x\"\n  }\n}",
            operation_name: Some("Q"),
            variables: vec![("id", &id)],
        };
        let body = executor("http://localhost:4001/graphql")
            .build_body(&request)
            .unwrap();

        insta::assert_snapshot!(String::from_utf8_lossy(&body), @r#"{"query":"query ($id: ID!) {\n  product(id: $id) {\n    \"x\"\n  }\n}","operationName":"Q","variables":{"id":"1"}}"#);
    }

    #[test]
    fn rejects_invalid_endpoints() {
        let client = Client::builder(TokioExecutor::new()).build_http();
        let error = HttpSourceSchemaExecutor::new(
            "not a uri",
            Arc::new(client),
            Arc::new(Semaphore::new(1)),
        )
        .unwrap_err();

        assert!(matches!(error, ExecutorError::EndpointParseFailure(..)));
    }

    #[tokio::test]
    async fn posts_sub_queries_and_parses_the_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("content-type", "application/json; charset=utf-8")
            .match_body(r#"{"query":"{\n  product {\n    id\n  }\n}\n"}"#)
            .with_status(200)
            .with_body(r#"{"data":{"product":{"id":"1"}}}"#)
            .create_async()
            .await;

        let executor = executor(&format!("{}/graphql", server.url()));
        let response = executor
            .execute(SourceSchemaRequest {
                query: "{\n  product {\n    id\n  }\n}\n",
                operation_name: None,
                variables: Vec::new(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.data.to_json(), r#"{"product":{"id":"1"}}"#);
    }

    #[tokio::test]
    async fn reports_failed_non_graphql_responses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let executor = executor(&format!("{}/graphql", server.url()));
        let error = executor
            .execute(SourceSchemaRequest {
                query: "{ a }",
                operation_name: None,
                variables: Vec::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(error, ExecutorError::RequestFailure(_, message) if message.contains("502")));
    }
}
