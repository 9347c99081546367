//! Find-or-create the per-day parent message, then reply under it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use nippo_core::{parent_message_text, ParentMatcher, SubmissionError};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::api::{HistoryMessage, PostMessage, SlackApi, SlackApiError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadSubmission {
    pub parent_ts: String,
    pub reply_ts: String,
    pub parent_created: bool,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("date label and report text are required")]
    MissingInput,
    #[error("date label `{label}` cannot be used as a match key: {detail}")]
    InvalidDateLabel { label: String, detail: String },
    #[error("history fetch failed: {0}")]
    HistoryFetch(#[source] SlackApiError),
    #[error("parent message post failed: {0}")]
    ParentPost(#[source] SlackApiError),
    #[error("reply post failed: {0}")]
    ReplyPost(#[source] SlackApiError),
}

impl From<SubmitError> for SubmissionError {
    fn from(value: SubmitError) -> Self {
        match value {
            SubmitError::MissingInput | SubmitError::InvalidDateLabel { .. } => {
                Self::MissingFields
            }
            SubmitError::HistoryFetch(source) => Self::HistoryFetch(source.to_string()),
            SubmitError::ParentPost(source) => Self::ParentPost(source.to_string()),
            SubmitError::ReplyPost(source) => Self::ReplyPost(source.to_string()),
        }
    }
}

/// One lock per date label so two submissions for the same day cannot both
/// miss the parent and create it twice. Only covers this process.
#[derive(Default)]
struct LabelLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl LabelLocks {
    fn lock_for(&self, date_label: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(date_label.to_owned()).or_default().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub struct ThreadResolver {
    api: Arc<dyn SlackApi>,
    channel_id: String,
    history_limit: u32,
    locks: LabelLocks,
}

impl ThreadResolver {
    pub fn new(api: Arc<dyn SlackApi>, channel_id: impl Into<String>, history_limit: u32) -> Self {
        Self {
            api,
            channel_id: channel_id.into(),
            history_limit,
            locks: LabelLocks::default(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Posts `text` as a reply under the parent for `date_label`, creating
    /// the parent first when none is visible in the latest history page.
    ///
    /// A parent created before a failed reply is left in place.
    pub async fn submit(
        &self,
        date_label: &str,
        text: &str,
        correlation_id: &str,
    ) -> Result<ThreadSubmission, SubmitError> {
        let date_label = date_label.trim();
        if date_label.is_empty() || text.trim().is_empty() {
            return Err(SubmitError::MissingInput);
        }

        let matcher = ParentMatcher::new(date_label).map_err(|error| {
            SubmitError::InvalidDateLabel { label: date_label.to_owned(), detail: error.to_string() }
        })?;

        let label_lock = self.locks.lock_for(date_label);
        let _serialized = label_lock.lock().await;

        let (parent_ts, parent_created) = self.resolve_parent(&matcher, correlation_id).await?;

        let reply = PostMessage::reply(&self.channel_id, text, &parent_ts);
        let posted = self.api.post_message(&reply).await.map_err(|source| {
            error!(
                event_name = "report.thread.reply_failed",
                correlation_id = %correlation_id,
                date_label = %date_label,
                thread_ts = %parent_ts,
                error = %source,
                payload = ?source.payload(),
                "failed to post daily report reply"
            );
            SubmitError::ReplyPost(source)
        })?;

        info!(
            event_name = "report.thread.reply_posted",
            correlation_id = %correlation_id,
            date_label = %date_label,
            thread_ts = %parent_ts,
            reply_ts = %posted.ts,
            parent_created,
            "daily report posted"
        );

        Ok(ThreadSubmission { parent_ts, reply_ts: posted.ts, parent_created })
    }

    async fn resolve_parent(
        &self,
        matcher: &ParentMatcher,
        correlation_id: &str,
    ) -> Result<(String, bool), SubmitError> {
        let history = self
            .api
            .conversations_history(&self.channel_id, self.history_limit)
            .await
            .map_err(|source| {
                error!(
                    event_name = "report.thread.history_failed",
                    correlation_id = %correlation_id,
                    date_label = %matcher.date_label(),
                    error = %source,
                    payload = ?source.payload(),
                    "failed to fetch channel history"
                );
                SubmitError::HistoryFetch(source)
            })?;

        debug!(
            event_name = "report.thread.history_scanned",
            correlation_id = %correlation_id,
            date_label = %matcher.date_label(),
            message_count = history.len(),
            "scanning history for parent message"
        );

        if let Some(existing) = find_parent(history, matcher) {
            info!(
                event_name = "report.thread.parent_reused",
                correlation_id = %correlation_id,
                date_label = %matcher.date_label(),
                thread_ts = %existing.ts,
                "reusing existing parent message"
            );
            return Ok((existing.ts, false));
        }

        let parent =
            PostMessage::top_level(&self.channel_id, parent_message_text(matcher.date_label()));
        let posted = self.api.post_message(&parent).await.map_err(|source| {
            error!(
                event_name = "report.thread.parent_failed",
                correlation_id = %correlation_id,
                date_label = %matcher.date_label(),
                error = %source,
                payload = ?source.payload(),
                "failed to post parent message"
            );
            SubmitError::ParentPost(source)
        })?;

        info!(
            event_name = "report.thread.parent_created",
            correlation_id = %correlation_id,
            date_label = %matcher.date_label(),
            thread_ts = %posted.ts,
            "created parent message"
        );
        Ok((posted.ts, true))
    }
}

/// Newest matching message wins, whatever order the page arrived in.
fn find_parent(
    mut history: Vec<HistoryMessage>,
    matcher: &ParentMatcher,
) -> Option<HistoryMessage> {
    history.sort_by(|left, right| right.ts_key().cmp(&left.ts_key()));
    history.into_iter().find(|message| matcher.is_parent(&message.text))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nippo_core::ParentMatcher;

    use super::{find_parent, LabelLocks};
    use crate::api::HistoryMessage;

    fn message(ts: &str, text: &str) -> HistoryMessage {
        HistoryMessage { ts: ts.to_owned(), text: text.to_owned(), thread_ts: None }
    }

    #[test]
    fn newest_matching_parent_wins_regardless_of_page_order() {
        let matcher = ParentMatcher::new("5/27").expect("pattern");
        let history = vec![
            message("1700000000.000100", "📅 5/27 日報"),
            message("1800000000.000100", "雑談 5/27"),
            message("1790000000.000100", "📅 5/27 日報\n再作成"),
        ];

        let parent = find_parent(history, &matcher).expect("parent should be found");
        assert_eq!(parent.ts, "1790000000.000100");
    }

    #[test]
    fn no_parent_when_nothing_matches() {
        let matcher = ParentMatcher::new("5/28").expect("pattern");
        let history = vec![message("1.0", "📅 5/27 日報"), message("2.0", "5/28 ランチ")];

        assert!(find_parent(history, &matcher).is_none());
    }

    #[test]
    fn label_locks_are_shared_per_label_and_pruned_when_idle() {
        let locks = LabelLocks::default();

        let first = locks.lock_for("5/27");
        let again = locks.lock_for("5/27");
        assert!(Arc::ptr_eq(&first, &again));

        let other = locks.lock_for("5/28");
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(locks.len(), 2);

        drop(first);
        drop(again);
        drop(other);
        let _next = locks.lock_for("5/29");
        assert_eq!(locks.len(), 1);
    }
}
