//! HTTP clients for the upstream data sources and the announcement
//! platforms.
//!
//! Gated behind the `client` cargo feature so crates that only need the wire
//! objects do not pull in `reqwest`.

mod discord;
mod mastodon;
mod telegram;
mod twitter;
mod upstream;

pub use discord::DiscordClient;
pub use mastodon::MastodonClient;
pub use telegram::TelegramClient;
pub use twitter::TwitterClient;
pub use upstream::{
    HttpUpstream, Upstream, UpstreamEndpoints, UpstreamRequest, fetch_dune, fetch_graph,
    fetch_rpc,
};

use reqwest::StatusCode;

/// Errors produced by the HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The GraphQL endpoint answered with an `errors` array.
    #[error("graphql error: {0}")]
    Graph(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The payload was well-formed but carried no result.
    #[error("empty response from {0}")]
    Empty(&'static str),

    /// The platform accepted the request but reported a failure in the body.
    #[error("platform rejected request: {0}")]
    Rejected(String),
}

/// Default per-request timeout for every client.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub(crate) fn default_http_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent.to_string())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
