//! Telegram Bot API client.

use super::{ClientError, default_http_client, parse_response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

const TELEGRAM_API_URL: &str = "https://api.telegram.org/";

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    username: Option<String>,
    first_name: String,
}

/// Sends messages to one Telegram chat or channel.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: default_http_client(user_agent),
            base_url: Url::parse(TELEGRAM_API_URL)?,
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// `getMe` – validates the token and returns the bot's display name.
    pub async fn get_me(&self) -> Result<String, ClientError> {
        let resp = self.http.get(self.method_url("getMe")?).send().await?;
        let user: TelegramUser = unwrap_result(parse_response(resp).await?)?;
        Ok(user.username.unwrap_or(user.first_name))
    }

    /// `sendMessage` using Markdown formatting and no link previews.
    pub async fn send_message(&self, text: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.method_url("sendMessage")?)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
                "disable_web_page_preview": true,
            }))
            .send()
            .await?;
        let _: serde_json::Value = unwrap_result(parse_response(resp).await?)?;
        Ok(())
    }

    fn method_url(&self, method: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(&format!("bot{}/{method}", self.token))?)
    }
}

fn unwrap_result<T>(response: TelegramResponse<T>) -> Result<T, ClientError> {
    if !response.ok {
        return Err(ClientError::Rejected(
            response.description.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    response.result.ok_or(ClientError::Empty("telegram"))
}
