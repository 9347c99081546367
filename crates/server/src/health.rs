use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;
use crate::submission::Submitter;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub slack: HealthCheck,
    pub checked_at: String,
}

/// Readiness only reflects local configuration; Slack itself is not contacted.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ready = state.submitter.is_ready();
    let slack = slack_check(&state.submitter);

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        slack,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn slack_check(submitter: &Submitter) -> HealthCheck {
    match submitter.check() {
        Ok(resolver) => HealthCheck {
            status: "ready",
            detail: format!("posting to channel {}", resolver.channel_id()),
        },
        Err(error) => HealthCheck { status: "degraded", detail: error.user_message() },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::health;
    use crate::testing::{ready_state, unconfigured_state, RecordingSlack, CHANNEL};

    #[tokio::test]
    async fn health_is_ready_when_slack_is_configured() {
        let slack = Arc::new(RecordingSlack::default());

        let (status, Json(payload)) = health(State(ready_state(&slack))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert!(payload.slack.detail.contains(CHANNEL));
        assert_eq!(slack.history_calls().await, 0);
    }

    #[tokio::test]
    async fn health_is_degraded_without_slack_credentials() {
        let (status, Json(payload)) = health(State(unconfigured_state())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.slack.status, "degraded");
        assert!(payload.slack.detail.contains("slack.bot_token"));
    }
}
