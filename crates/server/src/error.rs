use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nippo_core::SubmissionError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON error response for the submission API. Only the stage message leaves
/// the process; upstream payloads are logged where they happen.
#[derive(Debug)]
pub struct ApiError(pub SubmissionError);

impl From<SubmissionError> for ApiError {
    fn from(value: SubmissionError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { error: self.0.user_message() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use nippo_core::SubmissionError;

    use super::ApiError;

    #[test]
    fn status_follows_submission_category() {
        let cases = [
            (SubmissionError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (SubmissionError::MissingFields, StatusCode::BAD_REQUEST),
            (SubmissionError::MissingConfiguration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (SubmissionError::ReplyPost("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).into_response().status(), expected);
        }
    }
}
