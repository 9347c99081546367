pub mod config;
pub mod errors;
pub mod report;
pub mod thread;

pub use config::{AppConfig, ConfigError, LoadOptions, SlackTarget};
pub use errors::SubmissionError;
pub use report::{Report, ReportValidationError};
pub use thread::{parent_message_text, ParentMatcher, PARENT_MARKER};
