//! Slack integration for daily reports.
//!
//! - **Web API** (`api`, `web`) - `conversations.history` and `chat.postMessage`
//!   behind the [`SlackApi`] trait, with a `reqwest` implementation.
//! - **Threads** (`thread`) - [`ThreadResolver`], which finds or creates the
//!   parent message for a date label and posts the report as a reply.
//!
//! # Flow
//!
//! ```text
//! submit(date_label, text)
//!   → conversations.history (one page, newest first)
//!   → reuse parent ts | chat.postMessage (parent template)
//!   → chat.postMessage (thread_ts = parent ts)
//! ```

pub mod api;
pub mod thread;
pub mod web;

pub use api::{HistoryMessage, PostMessage, PostedMessage, SlackApi, SlackApiError};
pub use thread::{SubmitError, ThreadResolver, ThreadSubmission};
pub use web::SlackWebClient;
