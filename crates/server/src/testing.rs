use std::io;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use async_trait::async_trait;
use nippo_slack::{HistoryMessage, PostMessage, PostedMessage, SlackApi, SlackApiError};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::subscriber::DefaultGuard;

use crate::state::AppState;
use crate::submission::Submitter;

pub const CHANNEL: &str = "C0DAILY";

#[derive(Default)]
pub struct RecordingSlack {
    state: Mutex<RecordingState>,
}

#[derive(Default)]
struct RecordingState {
    history: Vec<HistoryMessage>,
    fail_history: bool,
    history_calls: usize,
    posts: Vec<PostMessage>,
}

impl RecordingSlack {
    pub fn with_history(history: Vec<HistoryMessage>) -> Self {
        Self { state: Mutex::new(RecordingState { history, ..RecordingState::default() }) }
    }

    pub fn failing_history() -> Self {
        let state = RecordingState { fail_history: true, ..RecordingState::default() };
        Self { state: Mutex::new(state) }
    }

    pub async fn history_calls(&self) -> usize {
        self.state.lock().await.history_calls
    }

    pub async fn posts(&self) -> Vec<PostMessage> {
        self.state.lock().await.posts.clone()
    }
}

#[async_trait]
impl SlackApi for RecordingSlack {
    async fn conversations_history(
        &self,
        _channel: &str,
        _limit: u32,
    ) -> Result<Vec<HistoryMessage>, SlackApiError> {
        let mut state = self.state.lock().await;
        state.history_calls += 1;
        if state.fail_history {
            return Err(SlackApiError::Api {
                method: "conversations.history",
                error: "invalid_auth".to_owned(),
                payload: json!({"ok": false, "error": "invalid_auth"}),
            });
        }
        Ok(state.history.clone())
    }

    async fn post_message(&self, message: &PostMessage) -> Result<PostedMessage, SlackApiError> {
        let mut state = self.state.lock().await;
        state.posts.push(message.clone());
        Ok(PostedMessage {
            channel: Some(message.channel.clone()),
            ts: format!("1780000000.{:06}", state.posts.len()),
        })
    }
}

pub fn history_message(ts: &str, text: &str) -> HistoryMessage {
    HistoryMessage { ts: ts.to_owned(), text: text.to_owned(), thread_ts: None }
}

pub fn ready_state(slack: &Arc<RecordingSlack>) -> AppState {
    AppState::new(Submitter::with_api(slack.clone(), CHANNEL.to_owned(), 100))
        .expect("templates should compile")
}

pub fn unconfigured_state() -> AppState {
    AppState::new(Submitter::Unconfigured("slack.bot_token is required".to_owned()))
        .expect("templates should compile")
}

/// Collects formatted log lines for the current thread until dropped.
pub struct CapturedLogs {
    buffer: Arc<StdMutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

struct SharedWriter(Arc<StdMutex<Vec<u8>>>);

impl io::Write for SharedWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    pub fn install() -> Self {
        let buffer = Arc::new(StdMutex::new(Vec::new()));
        let writer_buffer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || SharedWriter(writer_buffer.clone()))
            .finish();
        Self { buffer, _guard: tracing::subscriber::set_default(subscriber) }
    }

    pub fn contents(&self) -> String {
        let bytes = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
