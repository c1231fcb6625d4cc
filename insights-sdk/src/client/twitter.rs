//! Twitter/X v2 API client using a user-context OAuth 2.0 token.

use super::{ClientError, default_http_client, parse_response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

const TWITTER_API_URL: &str = "https://api.twitter.com/2/";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Me {
    username: String,
}

#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl TwitterClient {
    pub fn new(access_token: impl Into<String>, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: default_http_client(user_agent),
            base_url: Url::parse(TWITTER_API_URL)?,
            access_token: access_token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// `GET /2/users/me`
    pub async fn me(&self) -> Result<String, ClientError> {
        let resp = self
            .http
            .get(self.base_url.join("users/me")?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let me: Envelope<Me> = parse_response(resp).await?;
        Ok(me.data.username)
    }

    /// `POST /2/tweets`
    pub async fn tweet(&self, text: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.base_url.join("tweets")?)
            .bearer_auth(&self.access_token)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        let _: serde_json::Value = parse_response(resp).await?;
        Ok(())
    }
}
