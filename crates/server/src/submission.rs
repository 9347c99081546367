use std::sync::Arc;
use std::time::Duration;

use nippo_core::{AppConfig, SlackTarget, SubmissionError};
use nippo_slack::{SlackApi, SlackWebClient, ThreadResolver, ThreadSubmission};
use tracing::error;

/// Entry point the HTTP handlers call into. When Slack credentials are absent
/// the server still runs and every submission answers with the config gap.
#[derive(Clone)]
pub enum Submitter {
    Ready(Arc<ThreadResolver>),
    Unconfigured(String),
}

impl Submitter {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let target = match SlackTarget::from_config(&config.slack) {
            Ok(target) => target,
            Err(error) => return Ok(Self::Unconfigured(error.to_string())),
        };

        let client = SlackWebClient::new(
            &config.slack.api_base_url,
            target.bot_token,
            Duration::from_secs(config.slack.timeout_secs),
        )?;

        Ok(Self::with_api(Arc::new(client), target.channel_id, config.slack.history_limit))
    }

    pub fn with_api(api: Arc<dyn SlackApi>, channel_id: String, history_limit: u32) -> Self {
        Self::Ready(Arc::new(ThreadResolver::new(api, channel_id, history_limit)))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn check(&self) -> Result<&ThreadResolver, SubmissionError> {
        match self {
            Self::Ready(resolver) => Ok(resolver),
            Self::Unconfigured(reason) => {
                Err(SubmissionError::MissingConfiguration(reason.clone()))
            }
        }
    }

    /// Like [`Submitter::check`], but records the configuration gap against
    /// the request it blocks.
    pub fn ready(&self, correlation_id: &str) -> Result<&ThreadResolver, SubmissionError> {
        self.check().map_err(|config_error| {
            error!(
                event_name = "report.submit.unconfigured",
                correlation_id = %correlation_id,
                error = %config_error,
                "report submission rejected: slack is not configured"
            );
            config_error
        })
    }

    pub async fn submit(
        &self,
        date_label: &str,
        text: &str,
        correlation_id: &str,
    ) -> Result<ThreadSubmission, SubmissionError> {
        let resolver = self.ready(correlation_id)?;
        resolver.submit(date_label, text, correlation_id).await.map_err(SubmissionError::from)
    }
}
