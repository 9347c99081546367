use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::api::{
    decode_response, HistoryMessage, HistoryPage, PostMessage, PostedMessage, SlackApi,
    SlackApiError, HISTORY_METHOD, POST_MESSAGE_METHOD,
};

/// `reqwest`-backed Web API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackWebClient {
    client: Client,
    base_url: String,
    bot_token: SecretString,
}

impl std::fmt::Debug for SlackWebClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackWebClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl SlackWebClient {
    pub fn new(
        base_url: &str,
        bot_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), bot_token })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn read_payload(
        method: &'static str,
        response: reqwest::Response,
    ) -> Result<Value, SlackApiError> {
        let status = response.status();
        response.json::<Value>().await.map_err(|error| SlackApiError::Decode {
            method,
            detail: format!("http {status}: {error}"),
        })
    }
}

#[async_trait]
impl SlackApi for SlackWebClient {
    async fn conversations_history(
        &self,
        channel: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, SlackApiError> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.method_url(HISTORY_METHOD))
            .bearer_auth(self.bot_token.expose_secret())
            .query(&[("channel", channel), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|error| SlackApiError::Transport {
                method: HISTORY_METHOD,
                detail: error.to_string(),
            })?;

        let payload = Self::read_payload(HISTORY_METHOD, response).await?;
        let page: HistoryPage = decode_response(HISTORY_METHOD, payload)?;
        debug!(
            event_name = "slack.history.fetched",
            channel_id = %channel,
            message_count = page.messages.len(),
            "fetched channel history page"
        );
        Ok(page.messages)
    }

    async fn post_message(&self, message: &PostMessage) -> Result<PostedMessage, SlackApiError> {
        let response = self
            .client
            .post(self.method_url(POST_MESSAGE_METHOD))
            .bearer_auth(self.bot_token.expose_secret())
            .json(message)
            .send()
            .await
            .map_err(|error| SlackApiError::Transport {
                method: POST_MESSAGE_METHOD,
                detail: error.to_string(),
            })?;

        let payload = Self::read_payload(POST_MESSAGE_METHOD, response).await?;
        decode_response(POST_MESSAGE_METHOD, payload)
    }
}
