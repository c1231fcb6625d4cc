//! Discord bot REST client.

use super::{ClientError, default_http_client, parse_response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

const DISCORD_API_URL: &str = "https://discord.com/api/v10/";

/// `SUPPRESS_EMBEDS` message flag.
const SUPPRESS_EMBEDS: u64 = 1 << 2;

#[derive(Debug, Deserialize)]
struct CurrentUser {
    username: String,
}

/// Posts messages to a single Discord channel as a bot user.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    channel_id: u64,
}

impl DiscordClient {
    pub fn new(token: impl Into<String>, channel_id: u64, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: default_http_client(user_agent),
            base_url: Url::parse(DISCORD_API_URL)?,
            token: token.into(),
            channel_id,
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// `GET /users/@me` – validates the bot token and returns the bot name.
    pub async fn current_user(&self) -> Result<String, ClientError> {
        let url = self.base_url.join("users/@me")?;
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;
        let user: CurrentUser = parse_response(resp).await?;
        Ok(user.username)
    }

    /// `POST /channels/{id}/messages` with embeds suppressed.
    pub async fn send_message(&self, content: &str) -> Result<(), ClientError> {
        let url = self
            .base_url
            .join(&format!("channels/{}/messages", self.channel_id))?;
        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&json!({ "content": content, "flags": SUPPRESS_EMBEDS }))
            .send()
            .await?;
        let _: serde_json::Value = parse_response(resp).await?;
        Ok(())
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }
}
