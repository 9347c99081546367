use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tera::Tera;

use crate::{api, health, page, submission::Submitter};

#[derive(Clone)]
pub struct AppState {
    pub submitter: Submitter,
    pub templates: Arc<Tera>,
}

impl AppState {
    pub fn new(submitter: Submitter) -> Result<Self, tera::Error> {
        Ok(Self { submitter, templates: page::init_templates()? })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::show_form).post(page::submit_form))
        .route("/api/submit-daily", post(api::submit_daily).fallback(api::method_not_allowed))
        .route("/health", get(health::health))
        .with_state(state)
}
