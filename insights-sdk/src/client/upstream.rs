//! Upstream data sources: explorer GraphQL, node JSON-RPC and Dune.

use super::{ClientError, default_http_client, parse_response};
use crate::objects::dune::DuneResponse;
use crate::objects::graph::GraphResponse;
use crate::objects::rpc::RpcResponse;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

/// A single request against one of the upstreams.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamRequest {
    /// A GraphQL query document posted to the explorer.
    Graph { query: String },
    /// A JSON-RPC call against a State Chain node.
    Rpc {
        method: &'static str,
        params: Value,
    },
    /// The latest results of a saved Dune query.
    Dune { query_id: String },
}

/// Capability to fetch raw upstream payloads.
///
/// Feeders only depend on this trait, so tests can substitute canned
/// responses. Cancellation is expressed by dropping the returned future.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, ClientError>;
}

/// Base URLs and credentials for [`HttpUpstream`].
#[derive(Debug, Clone)]
pub struct UpstreamEndpoints {
    pub graph_url: Url,
    pub rpc_url: Url,
    pub dune_url: Url,
    pub dune_api_key: String,
}

/// [`Upstream`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
    endpoints: UpstreamEndpoints,
}

impl HttpUpstream {
    pub fn new(endpoints: UpstreamEndpoints, user_agent: &str) -> Self {
        Self {
            http: default_http_client(user_agent),
            endpoints,
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, ClientError> {
        let resp = match request {
            UpstreamRequest::Graph { query } => {
                self.http
                    .post(self.endpoints.graph_url.clone())
                    .json(&json!({ "query": query }))
                    .send()
                    .await?
            }
            UpstreamRequest::Rpc { method, params } => {
                self.http
                    .post(self.endpoints.rpc_url.clone())
                    .json(&json!({
                        "jsonrpc": "2.0",
                        "id": 1,
                        "method": method,
                        "params": params,
                    }))
                    .send()
                    .await?
            }
            UpstreamRequest::Dune { query_id } => {
                let url = self
                    .endpoints
                    .dune_url
                    .join(&format!("query/{query_id}/results"))?;
                self.http
                    .get(url)
                    .query(&[("api_key", self.endpoints.dune_api_key.as_str())])
                    .send()
                    .await?
            }
        };

        parse_response(resp).await
    }
}

/// Run a GraphQL query and unwrap the `data` member of the envelope.
pub async fn fetch_graph<T: DeserializeOwned>(
    upstream: &dyn Upstream,
    query: &str,
) -> Result<T, ClientError> {
    let raw = upstream
        .fetch(&UpstreamRequest::Graph {
            query: query.to_string(),
        })
        .await?;
    let response: GraphResponse<T> = serde_json::from_value(raw)?;
    if let Some(first) = response.errors.first() {
        return Err(ClientError::Graph(first.message.clone()));
    }
    response.data.ok_or(ClientError::Empty("graphql"))
}

/// Run a JSON-RPC call and unwrap its `result`.
pub async fn fetch_rpc<T: DeserializeOwned>(
    upstream: &dyn Upstream,
    method: &'static str,
    params: Value,
) -> Result<T, ClientError> {
    let raw = upstream
        .fetch(&UpstreamRequest::Rpc { method, params })
        .await?;
    let response: RpcResponse<T> = serde_json::from_value(raw)?;
    if let Some(error) = response.error {
        return Err(ClientError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response.result.ok_or(ClientError::Empty("rpc"))
}

/// Fetch the rows of the latest execution of a saved Dune query.
pub async fn fetch_dune<T: DeserializeOwned>(
    upstream: &dyn Upstream,
    query_id: &str,
) -> Result<Vec<T>, ClientError> {
    let raw = upstream
        .fetch(&UpstreamRequest::Dune {
            query_id: query_id.to_string(),
        })
        .await?;
    let response: DuneResponse<T> = serde_json::from_value(raw)?;
    response
        .result
        .map(|result| result.rows)
        .ok_or(ClientError::Empty("dune"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::graph::LastBlockData;

    struct Canned(Value);

    #[async_trait]
    impl Upstream for Canned {
        async fn fetch(&self, _request: &UpstreamRequest) -> Result<Value, ClientError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_fetch_graph_unwraps_data() {
        let upstream = Canned(json!({ "data": { "allBlocks": { "nodes": [{ "id": 42 }] } } }));
        let data: LastBlockData = fetch_graph(&upstream, "{ allBlocks { nodes { id } } }")
            .await
            .unwrap();
        assert_eq!(data.all_blocks.nodes[0].id, 42);
    }

    #[tokio::test]
    async fn test_fetch_graph_surfaces_errors() {
        let upstream = Canned(json!({ "errors": [{ "message": "boom" }] }));
        let result: Result<LastBlockData, _> = fetch_graph(&upstream, "{}").await;
        assert!(matches!(result, Err(ClientError::Graph(message)) if message == "boom"));
    }

    #[tokio::test]
    async fn test_fetch_rpc_surfaces_errors() {
        let upstream = Canned(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "Method not found" }
        }));
        let result: Result<String, _> = fetch_rpc(&upstream, "system_version", json!([])).await;
        assert!(matches!(result, Err(ClientError::Rpc { code: -32601, .. })));
    }

    #[tokio::test]
    async fn test_fetch_dune_without_result_is_empty() {
        let upstream = Canned(json!({ "state": "QUERY_STATE_PENDING" }));
        let result: Result<Vec<Value>, _> = fetch_dune(&upstream, "3358042").await;
        assert!(matches!(result, Err(ClientError::Empty("dune"))));
    }
}
