//! HTTP endpoint handlers. These are thin wrappers that forward to the workflow.
//! Each handler is instrumented and logs ids and basic result info.

use std::sync::Arc;
use std::time::Duration;

use axum::{
  extract::{rejection::JsonRejection, Path, State},
  http::Uri,
  Json,
};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult, ValidationError};
use crate::protocol::*;
use crate::state::AppState;
use crate::workflow::SubmissionRequest;

#[instrument(level = "info")]
pub async fn http_health() -> Json<ApiOut<HealthOut>> {
  let health = HealthOut { status: "healthy", service: "essay-scoring-backend" };
  Json(ApiOut::ok(health).with_message("サーバーは正常に動作しています"))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_tests(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiOut<Vec<TestSummaryOut>>>> {
  let tests = state.workflow.list_tests().await?;
  info!(target: "essay_backend", count = tests.len(), "HTTP tests listed");
  Ok(Json(ApiOut::ok(tests.iter().map(to_summary).collect())))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_test(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> AppResult<Json<ApiOut<TestDetailOut>>> {
  let test = state.workflow.get_test(&id).await?;
  Ok(Json(ApiOut::ok(to_detail(test))))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_submit_for_test(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  body: Result<Json<SubmitIn>, JsonRejection>,
) -> AppResult<Json<ApiOut<SubmitOut>>> {
  let Json(body) = body.map_err(malformed)?;
  if let Some(body_id) = &body.test_id {
    if body_id != &id {
      return Err(ValidationError::TestIdMismatch { path: id, body: body_id.clone() }.into());
    }
  }
  submit(&state, id, body).await
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_submit_legacy(
  State(state): State<Arc<AppState>>,
  body: Result<Json<SubmitIn>, JsonRejection>,
) -> AppResult<Json<ApiOut<SubmitOut>>> {
  let Json(body) = body.map_err(malformed)?;
  let test_id = match body.test_id.clone() {
    Some(id) if !id.is_empty() => id,
    _ => return Err(ValidationError::MissingField("test_id").into()),
  };
  submit(&state, test_id, body).await
}

async fn submit(state: &AppState, test_id: String, body: SubmitIn) -> AppResult<Json<ApiOut<SubmitOut>>> {
  let timeout = Duration::from_secs(state.config.workflow.submit_timeout_secs);
  let deadline = Instant::now().checked_add(timeout);
  if deadline.is_none() {
    warn!(target: "submission", timeout_secs = timeout.as_secs(), "Submit timeout does not fit a deadline; running unbounded");
  }
  let request = SubmissionRequest {
    test_id,
    user_id: body.user_id,
    answers: to_drafts(body.answers),
  };
  let receipt = state.workflow.submit(request, deadline).await?;
  info!(target: "submission", result_id = %receipt.result_id, total = receipt.total_score, "HTTP submission scored");
  Ok(Json(ApiOut::ok(to_submit_out(receipt)).with_message("小論文が正常に提出されました")))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_results(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiOut<Vec<ResultOut>>>> {
  let results = state.workflow.list_results().await?;
  Ok(Json(ApiOut::ok(results.into_iter().map(to_result_out).collect())))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_result(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> AppResult<Json<ApiOut<ResultOut>>> {
  let result = state.workflow.get_result(&id).await?;
  Ok(Json(ApiOut::ok(to_result_out(result))))
}

#[instrument(level = "info", skip(state), fields(submission_id = %id))]
pub async fn http_get_result_by_submission(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> AppResult<Json<ApiOut<ResultOut>>> {
  let result = state.workflow.get_result_by_submission(&id).await?;
  Ok(Json(ApiOut::ok(to_result_out(result))))
}

pub async fn http_not_found(uri: Uri) -> AppError {
  AppError::not_found("route", uri.path())
}

fn malformed(rejection: JsonRejection) -> AppError {
  ValidationError::MalformedBody(rejection.body_text()).into()
}
