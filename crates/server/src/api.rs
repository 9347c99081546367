//! `POST /api/submit-daily`: the JSON endpoint the report form calls.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use nippo_core::SubmissionError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body. `channel` may be sent by older clients; it is ignored and the
/// configured channel is always used.
#[derive(Debug, Deserialize)]
pub struct SubmitDailyRequest {
    #[serde(rename = "dateLabel")]
    pub date_label: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitDailyResponse {
    pub success: bool,
}

pub async fn submit_daily(
    State(state): State<AppState>,
    payload: Result<Json<SubmitDailyRequest>, JsonRejection>,
) -> Result<Json<SubmitDailyResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    state.submitter.ready(&correlation_id)?;

    let request = payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(
            event_name = "report.submit.rejected",
            correlation_id = %correlation_id,
            error = %rejection,
            "unreadable submission body"
        );
        SubmissionError::MissingFields
    })?;

    let (Some(date_label), Some(text)) = (non_blank(request.date_label), non_blank(request.text))
    else {
        warn!(
            event_name = "report.submit.rejected",
            correlation_id = %correlation_id,
            "submission is missing dateLabel or text"
        );
        return Err(SubmissionError::MissingFields.into());
    };

    info!(
        event_name = "report.submit.received",
        correlation_id = %correlation_id,
        date_label = %date_label,
        text_len = text.len(),
        "daily report submission received"
    );

    state.submitter.submit(&date_label, &text, &correlation_id).await?;
    Ok(Json(SubmitDailyResponse { success: true }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError(SubmissionError::MethodNotAllowed)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
