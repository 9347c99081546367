//! Server-rendered report form at `/`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Html, Form};
use chrono::Local;
use nippo_core::report::{
    date_label_for, end_time_options, failure_message, time_options, SUBMITTED_MESSAGE,
};
use nippo_core::Report;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::state::AppState;

const FORM_TEMPLATE: &str = "report_form.html";

#[derive(Debug, Serialize)]
struct Alert {
    kind: &'static str,
    message: String,
}

pub fn init_templates() -> Result<Arc<Tera>, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(FORM_TEMPLATE, include_str!("../../../templates/report_form.html"))?;
    Ok(Arc::new(tera))
}

type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

pub async fn show_form(State(state): State<AppState>) -> PageResult {
    let today = date_label_for(Local::now().date_naive());
    let report = Report { date_label: today, ..Report::default() };
    render(&state.templates, &report, None)
}

pub async fn submit_form(
    State(state): State<AppState>,
    Form(report): Form<Report>,
) -> PageResult {
    let correlation_id = Uuid::new_v4().to_string();

    if let Err(validation) = report.validate() {
        warn!(
            event_name = "report.form.invalid",
            correlation_id = %correlation_id,
            error = %validation,
            "report form failed validation"
        );
        let alert = Alert { kind: "warning", message: validation.to_string() };
        return render(&state.templates, &report, Some(alert));
    }

    let text = report.compose();
    match state.submitter.submit(report.date_label.trim(), &text, &correlation_id).await {
        Ok(submission) => {
            info!(
                event_name = "report.form.submitted",
                correlation_id = %correlation_id,
                date_label = %report.date_label,
                thread_ts = %submission.parent_ts,
                "report submitted from form"
            );
            // Cleared form for the next report, same day.
            let next = Report { date_label: report.date_label.clone(), ..Report::default() };
            let alert = Alert { kind: "success", message: SUBMITTED_MESSAGE.to_owned() };
            render(&state.templates, &next, Some(alert))
        }
        Err(submission_error) => {
            let alert =
                Alert { kind: "error", message: failure_message(&submission_error.user_message()) };
            render(&state.templates, &report, Some(alert))
        }
    }
}

fn render(templates: &Tera, report: &Report, alert: Option<Alert>) -> PageResult {
    let mut context = Context::new();
    context.insert("report", report);
    context.insert("time_options", &time_options());
    context.insert("end_time_options", &end_time_options(Some(report.start_time.as_str())));
    context.insert("alert", &alert);

    templates.render(FORM_TEMPLATE, &context).map(Html).map_err(|render_error| {
        error!(
            event_name = "report.form.render_failed",
            error = ?render_error,
            "report form template failed to render"
        );
        (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Template Error</h1>".to_owned()))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::state::router;
    use crate::testing::{ready_state, unconfigured_state, RecordingSlack};

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .expect("request should build")
    }

    async fn read_html(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 page")
    }

    #[tokio::test]
    async fn form_page_lists_shift_times() {
        let slack = Arc::new(RecordingSlack::default());
        let request = Request::builder().uri("/").body(Body::empty()).expect("request should build");

        let response = router(ready_state(&slack)).oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let html = read_html(response).await;
        assert!(html.contains("value=\"10:00\""));
        assert!(html.contains("value=\"19:00\""));
        assert!(!html.contains("value=\"19:30\""));
    }

    #[tokio::test]
    async fn valid_form_posts_report_into_thread() {
        let slack = Arc::new(RecordingSlack::default());

        let response = router(ready_state(&slack))
            .oneshot(form_request(concat!(
                "date=5%2F27&name=%E5%B1%B1%E7%94%B0",
                "&startTime=10%3A00&endTime=19%3A00&achievements=done",
            )))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(read_html(response).await.contains("✅ 送信完了！"));

        let posts = slack.posts().await;
        assert_eq!(posts.len(), 2);
        assert!(posts[1].text.starts_with("📅 日付：5/27\n👤 名前：山田"));
        assert_eq!(posts[1].thread_ts.as_deref(), Some("1780000000.000001"));
    }

    #[tokio::test]
    async fn end_before_start_never_reaches_slack() {
        let slack = Arc::new(RecordingSlack::default());

        let response = router(ready_state(&slack))
            .oneshot(form_request("date=5%2F27&name=a&startTime=18%3A00&endTime=10%3A00"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(read_html(response).await.contains("終業時間は始業時間より後に設定してください"));
        assert_eq!(slack.history_calls().await, 0);
        assert!(slack.posts().await.is_empty());
    }

    #[tokio::test]
    async fn missing_name_is_reported_inline() {
        let slack = Arc::new(RecordingSlack::default());

        let response = router(ready_state(&slack))
            .oneshot(form_request("date=5%2F27&startTime=10%3A00&endTime=12%3A00"))
            .await
            .expect("response");

        assert!(read_html(response).await.contains("名前・勤務時間をすべて入力してください"));
        assert_eq!(slack.history_calls().await, 0);
    }

    #[tokio::test]
    async fn submission_failure_is_shown_with_reason() {
        let response = router(unconfigured_state())
            .oneshot(form_request("date=5%2F27&name=a&startTime=10%3A00&endTime=12%3A00"))
            .await
            .expect("response");

        let html = read_html(response).await;
        assert!(html.contains("❌ 送信失敗：Server configuration missing"));
    }
}
