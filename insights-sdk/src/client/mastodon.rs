//! Mastodon REST client.

use super::{ClientError, default_http_client, parse_response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

#[derive(Debug, Deserialize)]
struct Account {
    acct: String,
}

#[derive(Debug, Clone)]
pub struct MastodonClient {
    http: reqwest::Client,
    instance_url: Url,
    access_token: String,
}

impl MastodonClient {
    /// * `instance_url` – root of the instance, e.g. `https://mastodon.social/`.
    pub fn new(instance_url: Url, access_token: impl Into<String>, user_agent: &str) -> Self {
        Self {
            http: default_http_client(user_agent),
            instance_url,
            access_token: access_token.into(),
        }
    }

    /// `GET /api/v1/accounts/verify_credentials`
    pub async fn verify_credentials(&self) -> Result<String, ClientError> {
        let resp = self
            .http
            .get(self.instance_url.join("api/v1/accounts/verify_credentials")?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let account: Account = parse_response(resp).await?;
        Ok(account.acct)
    }

    /// `POST /api/v1/statuses` with public visibility.
    pub async fn post_status(&self, status: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.instance_url.join("api/v1/statuses")?)
            .bearer_auth(&self.access_token)
            .json(&json!({ "status": status, "visibility": "public" }))
            .send()
            .await?;
        let _: serde_json::Value = parse_response(resp).await?;
        Ok(())
    }
}
