//! Error taxonomy shared by the scorer, the stores and the HTTP layer.
//!
//! Each layer has its own `thiserror` enum; `AppError` is what workflow calls
//! return and what handlers turn into a status code + `ApiOut` failure body.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use crate::protocol::ApiOut;
use thiserror::Error;
use tracing::{error, warn};

/// Client-side input problems. Never retryable, never has side effects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("expected {expected} answers, got {actual}")]
  AnswerCount { expected: usize, actual: usize },

  #[error("test id in body ({body}) does not match path ({path})")]
  TestIdMismatch { path: String, body: String },

  #[error("missing field: {0}")]
  MissingField(&'static str),

  #[error("malformed request body: {0}")]
  MalformedBody(String),
}

/// The scorer was handed something its profile cannot grade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
  #[error("scoring profile expects {expected} answers, got {actual}")]
  UnsupportedShape { expected: usize, actual: usize },

  #[error("no length bucket matches question {question} (length {length})")]
  NoLengthBucket { question: u32, length: usize },
}

/// Any failure of a store call, propagated unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
  #[error("{entity} already exists: {id}")]
  Conflict { entity: &'static str, id: String },

  #[error("{operation} failed: {message}")]
  Backend { operation: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("scoring failed for submission {submission_id}: {source}")]
  Scoring {
    submission_id: String,
    #[source]
    source: ScoringError,
  },

  #[error("storage error: {0}")]
  Storage(#[from] StorageError),

  #[error("deadline exceeded before {stage} (submission: {})", .submission_id.as_deref().unwrap_or("none"))]
  DeadlineExceeded {
    stage: &'static str,
    submission_id: Option<String>,
  },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
  pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
    AppError::NotFound { entity, id: id.into() }
  }

  pub fn status_code(&self) -> StatusCode {
    match self {
      AppError::NotFound { .. } => StatusCode::NOT_FOUND,
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Scoring { .. } | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
    }
  }

  /// Stable machine-readable name used in the `error` field of responses.
  pub fn error_type(&self) -> &'static str {
    match self {
      AppError::NotFound { .. } => "not_found",
      AppError::Validation(_) => "validation_error",
      AppError::Scoring { .. } => "scoring_error",
      AppError::Storage(_) => "storage_error",
      AppError::DeadlineExceeded { .. } => "deadline_exceeded",
    }
  }
}


impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    if status.is_server_error() {
      error!(target: "essay_backend", error = %self, %status, "Request failed");
    } else {
      warn!(target: "essay_backend", error = %self, %status, "Request rejected");
    }
    let body = ApiOut::failure(self.error_type(), self.to_string());
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_mapping_follows_taxonomy() {
    assert_eq!(AppError::not_found("test", "x").status_code(), StatusCode::NOT_FOUND);
    let v: AppError = ValidationError::AnswerCount { expected: 2, actual: 1 }.into();
    assert_eq!(v.status_code(), StatusCode::BAD_REQUEST);
    let s: AppError = StorageError::Backend { operation: "create", message: "down".into() }.into();
    assert_eq!(s.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let sc = AppError::Scoring {
      submission_id: "s1".into(),
      source: ScoringError::UnsupportedShape { expected: 2, actual: 3 },
    };
    assert_eq!(sc.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let d = AppError::DeadlineExceeded { stage: "scoring", submission_id: None };
    assert_eq!(d.status_code(), StatusCode::GATEWAY_TIMEOUT);
  }

  #[test]
  fn messages_carry_ids_and_counts() {
    let v = ValidationError::AnswerCount { expected: 2, actual: 1 };
    assert_eq!(v.to_string(), "expected 2 answers, got 1");
    let sc = AppError::Scoring {
      submission_id: "sub-9".into(),
      source: ScoringError::UnsupportedShape { expected: 2, actual: 3 },
    };
    assert!(sc.to_string().contains("sub-9"));
    let d = AppError::DeadlineExceeded { stage: "result persistence", submission_id: Some("sub-1".into()) };
    assert!(d.to_string().contains("sub-1"));
  }
}
