use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const HISTORY_METHOD: &str = "conversations.history";
pub const POST_MESSAGE_METHOD: &str = "chat.postMessage";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HistoryMessage {
    pub ts: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl HistoryMessage {
    /// Orders Slack `ts` values (`"<seconds>.<micros>"`) numerically; anything
    /// unparseable sorts as the oldest possible message. Short fractions are
    /// read as microseconds, so `1.1` is `1.100000`.
    pub fn ts_key(&self) -> (u64, u64) {
        let (seconds, fraction) = self.ts.split_once('.').unwrap_or((self.ts.as_str(), "0"));
        let fraction = format!("{fraction:0<6}");
        match (seconds.parse::<u64>(), fraction.parse::<u64>()) {
            (Ok(seconds), Ok(fraction)) => (seconds, fraction),
            _ => (0, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl PostMessage {
    pub fn top_level(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self { channel: channel.into(), text: text.into(), thread_ts: None }
    }

    pub fn reply(
        channel: impl Into<String>,
        text: impl Into<String>,
        thread_ts: impl Into<String>,
    ) -> Self {
        Self { channel: channel.into(), text: text.into(), thread_ts: Some(thread_ts.into()) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PostedMessage {
    #[serde(default)]
    pub channel: Option<String>,
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryPage {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SlackApiError {
    #[error("slack {method} request failed: {detail}")]
    Transport { method: &'static str, detail: String },
    #[error("slack {method} returned an undecodable body: {detail}")]
    Decode { method: &'static str, detail: String },
    #[error("slack {method} returned error `{error}`")]
    Api { method: &'static str, error: String, payload: Value },
}

impl SlackApiError {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Transport { method, .. }
            | Self::Decode { method, .. }
            | Self::Api { method, .. } => method,
        }
    }

    /// The raw response body, when Slack answered with `ok: false`.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Api { payload, .. } => Some(payload),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

/// The two Web API methods the report flow consumes.
#[async_trait]
pub trait SlackApi: Send + Sync {
    async fn conversations_history(
        &self,
        channel: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, SlackApiError>;

    async fn post_message(&self, message: &PostMessage) -> Result<PostedMessage, SlackApiError>;
}

/// Splits a Web API response on its `ok` flag and decodes the success body.
pub(crate) fn decode_response<T>(method: &'static str, payload: Value) -> Result<T, SlackApiError>
where
    T: for<'de> Deserialize<'de>,
{
    if payload.get("ok").and_then(Value::as_bool) != Some(true) {
        let error = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_owned();
        return Err(SlackApiError::Api { method, error, payload });
    }

    serde_json::from_value(payload)
        .map_err(|error| SlackApiError::Decode { method, detail: error.to_string() })
}
