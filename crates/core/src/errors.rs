use thiserror::Error;

/// Failure categories a report submission can end in, from the caller's side.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("missing required fields")]
    MissingFields,
    #[error("server configuration missing: {0}")]
    MissingConfiguration(String),
    #[error("channel history fetch failed: {0}")]
    HistoryFetch(String),
    #[error("parent message post failed: {0}")]
    ParentPost(String),
    #[error("reply post failed: {0}")]
    ReplyPost(String),
}

impl SubmissionError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 405,
            Self::MissingFields => 400,
            Self::MissingConfiguration(_)
            | Self::HistoryFetch(_)
            | Self::ParentPost(_)
            | Self::ReplyPost(_) => 500,
        }
    }

    /// Message returned to the submitter. Upstream detail stays in the server log.
    pub fn user_message(&self) -> String {
        match self {
            Self::MethodNotAllowed => "Method not allowed".to_owned(),
            Self::MissingFields => "Missing required fields".to_owned(),
            Self::MissingConfiguration(detail) => {
                format!("Server configuration missing: {detail}")
            }
            Self::HistoryFetch(_) => "Failed to fetch channel history".to_owned(),
            Self::ParentPost(_) => "Failed to post parent message".to_owned(),
            Self::ReplyPost(_) => "Failed to post daily report".to_owned(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
