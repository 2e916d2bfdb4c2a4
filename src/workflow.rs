//! Submission workflow: validate, persist, score, issue the result.
//!
//! A submission moves `pending -> scored | failed` exactly once. Nothing is
//! persisted before validation passes, and once a submission exists every error
//! path leaves it `failed` rather than `pending` (best effort: if that update
//! also fails it is logged and the original error wins).

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Answer, EssayTest, ScoringResult, Submission, SubmissionStatus};
use crate::error::{AppError, AppResult};
use crate::lifecycle::{system_clock, Clock, ResultLifecycle};
use crate::scoring::Scorer;
use crate::store::{ResultStore, SubmissionStore, TestStore};
use crate::util::char_len;
use crate::validation::validate_answer_count;

pub const SCORED_MESSAGE: &str = "採点が完了しました";

/// One answer as received, before ids and counts are assigned.
#[derive(Clone, Debug)]
pub struct AnswerDraft {
  pub question_id: String,
  pub content: String,
}

#[derive(Clone, Debug)]
pub struct SubmissionRequest {
  pub test_id: String,
  pub user_id: Option<String>,
  pub answers: Vec<AnswerDraft>,
}

/// What the caller gets back after a successful submit.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionReceipt {
  pub result_id: String,
  pub submission_id: String,
  pub total_score: u32,
  pub max_score: u32,
  pub percentage: f64,
  pub message: String,
}

#[derive(Clone)]
pub struct SubmissionWorkflow {
  tests: Arc<dyn TestStore>,
  submissions: Arc<dyn SubmissionStore>,
  results: Arc<dyn ResultStore>,
  scorer: Arc<dyn Scorer>,
  lifecycle: ResultLifecycle,
  clock: Clock,
}

impl SubmissionWorkflow {
  pub fn new(
    tests: Arc<dyn TestStore>,
    submissions: Arc<dyn SubmissionStore>,
    results: Arc<dyn ResultStore>,
    scorer: Arc<dyn Scorer>,
    lifecycle: ResultLifecycle,
  ) -> Self {
    Self { tests, submissions, results, scorer, lifecycle, clock: system_clock() }
  }

  pub fn with_clock(mut self, clock: Clock) -> Self {
    self.clock = clock;
    self
  }

  pub fn results(&self) -> Arc<dyn ResultStore> {
    self.results.clone()
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn list_tests(&self) -> AppResult<Vec<EssayTest>> {
    Ok(self.tests.get_all().await?)
  }

  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn get_test(&self, id: &str) -> AppResult<EssayTest> {
    self.tests.get_by_id(id).await?.ok_or_else(|| AppError::not_found("test", id))
  }

  pub async fn get_submission(&self, id: &str) -> AppResult<Submission> {
    self
      .submissions
      .get_by_id(id)
      .await?
      .ok_or_else(|| AppError::not_found("submission", id))
  }

  /// Run one submission end to end. `deadline`, when given, is checked before
  /// creating the submission and before persisting its result.
  #[instrument(
    level = "info",
    skip(self, request, deadline),
    fields(test_id = %request.test_id, answers = request.answers.len(), submission_id = tracing::field::Empty)
  )]
  pub async fn submit(
    &self,
    request: SubmissionRequest,
    deadline: Option<Instant>,
  ) -> AppResult<SubmissionReceipt> {
    let test = self.get_test(&request.test_id).await?;

    if let Err(e) = validate_answer_count(&test.questions, &request.answers) {
      warn!(target: "submission", test_id = %test.id, error = %e, "Rejected submission");
      return Err(e.into());
    }

    check_deadline(deadline, "create_submission", None)?;
    let mut submission = self.build_submission(&test, request);
    tracing::Span::current().record("submission_id", submission.id.as_str());
    self.submissions.create(&submission).await?;
    info!(target: "submission", submission_id = %submission.id, test_id = %test.id, "Submission created");

    let card = match self.scorer.score(&submission) {
      Ok(card) => card,
      Err(source) => {
        error!(target: "submission", submission_id = %submission.id, error = %source, "Scoring failed");
        self.mark_failed(&mut submission).await;
        return Err(AppError::Scoring { submission_id: submission.id, source });
      }
    };

    if let Err(e) = check_deadline(deadline, "persist_result", Some(&submission.id)) {
      warn!(target: "submission", submission_id = %submission.id, "Deadline passed before result was stored");
      self.mark_failed(&mut submission).await;
      return Err(e);
    }

    let result = self.lifecycle.issue(card, &submission, &test, (self.clock)());
    if let Err(e) = self.results.create(&result).await {
      error!(target: "results", submission_id = %submission.id, error = %e, "Failed to store result");
      self.mark_failed(&mut submission).await;
      return Err(e.into());
    }

    submission.status = SubmissionStatus::Scored;
    submission.updated_at = (self.clock)();
    self.submissions.update(&submission).await?;

    info!(
      target: "submission",
      submission_id = %submission.id,
      result_id = %result.id,
      total = result.total_score,
      max = result.max_score,
      "Submission scored"
    );

    Ok(SubmissionReceipt {
      result_id: result.id,
      submission_id: submission.id,
      total_score: result.total_score,
      max_score: result.max_score,
      percentage: result.percentage,
      message: SCORED_MESSAGE.to_string(),
    })
  }

  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn get_result(&self, id: &str) -> AppResult<ScoringResult> {
    self.results.get_by_id(id).await?.ok_or_else(|| AppError::not_found("result", id))
  }

  #[instrument(level = "debug", skip(self), fields(%submission_id))]
  pub async fn get_result_by_submission(&self, submission_id: &str) -> AppResult<ScoringResult> {
    self
      .results
      .get_by_submission_id(submission_id)
      .await?
      .ok_or_else(|| AppError::not_found("result", submission_id))
  }

  pub async fn list_results(&self) -> AppResult<Vec<ScoringResult>> {
    Ok(self.results.get_all().await?)
  }

  pub async fn reap_expired(&self) -> AppResult<usize> {
    let removed = self.results.delete_expired().await?;
    info!(target: "results", removed, "Expired results reaped");
    Ok(removed)
  }

  fn build_submission(&self, test: &EssayTest, request: SubmissionRequest) -> Submission {
    let id = Uuid::new_v4().to_string();
    let now = (self.clock)();
    let answers = request
      .answers
      .into_iter()
      .map(|draft| Answer {
        id: Uuid::new_v4().to_string(),
        submission_id: id.clone(),
        word_count: char_len(&draft.content),
        question_id: draft.question_id,
        content: draft.content,
      })
      .collect();
    Submission {
      id,
      test_id: test.id.clone(),
      user_id: request.user_id,
      answers,
      status: SubmissionStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }

  async fn mark_failed(&self, submission: &mut Submission) {
    submission.status = SubmissionStatus::Failed;
    submission.updated_at = (self.clock)();
    if let Err(e) = self.submissions.update(submission).await {
      error!(target: "submission", submission_id = %submission.id, error = %e, "Could not mark submission failed");
    }
  }
}

fn check_deadline(deadline: Option<Instant>, stage: &'static str, submission_id: Option<&str>) -> AppResult<()> {
  match deadline {
    Some(at) if Instant::now() >= at => Err(AppError::DeadlineExceeded {
      stage,
      submission_id: submission_id.map(str::to_string),
    }),
    _ => Ok(()),
  }
}
