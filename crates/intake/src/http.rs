use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use bugdesk_core::model::submission::Submission;
use bugdesk_core::notify::Notifier;
use bugdesk_core::repository::ReportRepository;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::submit::Intake;

pub fn router<R, N>(intake: Arc<Intake<R, N>>) -> Router
where
    R: ReportRepository + 'static,
    N: Notifier + 'static,
{
    let submit = post(submit_report::<R, N>).layer(DefaultBodyLimit::max(
        intake.config().max_body_bytes,
    ));
    Router::new()
        .route("/", submit.clone())
        .route("/submit", submit)
        .route("/v1/reports/{id}", get(get_report::<R, N>))
        .route("/healthz", get(|| async { "ok" }))
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(intake)
}

async fn submit_report<R, N>(
    State(intake): State<Arc<Intake<R, N>>>,
    headers: HeaderMap,
    form: Result<Form<Submission>, FormRejection>,
) -> Response
where
    R: ReportRepository + 'static,
    N: Notifier + 'static,
{
    // A POST without a content type carries no form fields; every field is empty.
    let submission = match form {
        Ok(Form(submission)) => submission,
        Err(FormRejection::InvalidFormContentType(_))
            if !headers.contains_key(header::CONTENT_TYPE) =>
        {
            Submission::default()
        }
        Err(rejection) => return rejection.into_response(),
    };

    match intake.submit(submission).await {
        Ok(outcome) => outcome.id().to_string().into_response(),
        Err(err) => {
            tracing::error!(error = %err, "bug report submission failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_report<R, N>(
    State(intake): State<Arc<Intake<R, N>>>,
    Path(id): Path<i64>,
) -> Response
where
    R: ReportRepository + 'static,
    N: Notifier + 'static,
{
    match intake.repository().get_report(id) {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing::error!(id, error = %err, "bug report lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
