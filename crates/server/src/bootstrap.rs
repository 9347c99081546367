use nippo_core::config::AppConfig;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::AppState;
use crate::submission::Submitter;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("slack http client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("report form template failed to compile: {0}")]
    Templates(#[source] tera::Error),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let submitter = Submitter::from_config(&config).map_err(BootstrapError::HttpClient)?;
    match &submitter {
        Submitter::Ready(resolver) => info!(
            event_name = "system.bootstrap.slack_ready",
            correlation_id = "bootstrap",
            channel_id = %resolver.channel_id(),
            history_limit = config.slack.history_limit,
            "slack submission configured"
        ),
        Submitter::Unconfigured(reason) => warn!(
            event_name = "system.bootstrap.slack_unconfigured",
            correlation_id = "bootstrap",
            reason = %reason,
            "slack submission is not configured; submissions will fail until it is"
        ),
    }

    let state = AppState::new(submitter).map_err(BootstrapError::Templates)?;
    Ok(Application { config, state })
}
