//! Public protocol structs for the HTTP endpoints (serde ready).
//! Field names here are the stable JSON contract with the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CriteriaScore, EssayTest, Question, QuestionScore, ScoringCriteria, ScoringResult};
use crate::workflow::{AnswerDraft, SubmissionReceipt};

/// Envelope around every response body, success or failure.
#[derive(Debug, Serialize)]
pub struct ApiOut<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> ApiOut<T> {
  pub fn ok(data: T) -> Self {
    Self { success: true, data: Some(data), error: None, message: None }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }
}

impl ApiOut<()> {
  pub fn failure(error: &'static str, message: String) -> Self {
    Self { success: false, data: None, error: Some(error), message: Some(message) }
  }
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub status: &'static str,
  pub service: &'static str,
}

/// Listing view: no essay text, no scoring criteria.
#[derive(Debug, Serialize)]
pub struct TestSummaryOut {
  pub id: String,
  pub title: String,
  pub description: String,
  pub reading_time: String,
  pub writing_time: String,
  pub total_points: u32,
  pub difficulty: String,
  pub category: String,
  pub participants: u32,
  pub question_count: usize,
}

#[derive(Debug, Serialize)]
pub struct QuestionOut {
  pub id: String,
  pub number: u32,
  pub title: String,
  pub description: String,
  pub points: u32,
  pub character_limit: String,
}

#[derive(Debug, Serialize)]
pub struct ScoringCriteriaOut {
  pub main_thesis: String,
  pub key_points: Vec<String>,
  pub question2_topic: String,
}

#[derive(Debug, Serialize)]
pub struct TestDetailOut {
  pub id: String,
  pub title: String,
  pub description: String,
  pub reading_time: String,
  pub writing_time: String,
  pub total_points: u32,
  pub difficulty: String,
  pub category: String,
  pub participants: u32,
  pub essay_text: String,
  pub questions: Vec<QuestionOut>,
  pub scoring_criteria: ScoringCriteriaOut,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  pub question_id: String,
  #[serde(default)]
  pub content: String,
}

/// Submit body. `test_id` is required on the legacy route and optional on
/// `/api/v1/tests/:id/submit`, where it must match the path when present.
#[derive(Debug, Deserialize)]
pub struct SubmitIn {
  #[serde(default)]
  pub test_id: Option<String>,
  #[serde(default)]
  pub user_id: Option<String>,
  pub answers: Vec<AnswerIn>,
}

#[derive(Debug, Serialize)]
pub struct SubmitOut {
  pub result_id: String,
  pub submission_id: String,
  pub total_score: u32,
  pub max_score: u32,
  pub percentage: f64,
  pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CriteriaScoreOut {
  pub criteria_name: String,
  pub score: u32,
  pub max_score: u32,
  pub comment: String,
  pub reasoning: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionScoreOut {
  pub question_num: u32,
  pub score: u32,
  pub max_score: u32,
  pub percentage: f64,
  pub criteria_scores: Vec<CriteriaScoreOut>,
  pub comment: String,
  pub reasoning: String,
}

#[derive(Debug, Serialize)]
pub struct ResultOut {
  pub id: String,
  pub submission_id: String,
  pub test_id: String,
  pub test_title: String,
  pub total_score: u32,
  pub max_score: u32,
  pub percentage: f64,
  pub details: Vec<QuestionScoreOut>,
  pub feedback: String,
  pub scored_by: String,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

pub fn to_summary(t: &EssayTest) -> TestSummaryOut {
  TestSummaryOut {
    id: t.id.clone(),
    title: t.title.clone(),
    description: t.description.clone(),
    reading_time: t.reading_time.clone(),
    writing_time: t.writing_time.clone(),
    total_points: t.total_points,
    difficulty: t.difficulty.clone(),
    category: t.category.clone(),
    participants: t.participants,
    question_count: t.questions.len(),
  }
}

fn question_out(q: &Question) -> QuestionOut {
  QuestionOut {
    id: q.id.clone(),
    number: q.number,
    title: q.title.clone(),
    description: q.description.clone(),
    points: q.points,
    character_limit: q.character_limit.clone(),
  }
}

fn criteria_out(c: &ScoringCriteria) -> ScoringCriteriaOut {
  ScoringCriteriaOut {
    main_thesis: c.main_thesis.clone(),
    key_points: c.key_points.clone(),
    question2_topic: c.question2_topic.clone(),
  }
}

pub fn to_detail(t: EssayTest) -> TestDetailOut {
  TestDetailOut {
    questions: t.questions.iter().map(question_out).collect(),
    scoring_criteria: criteria_out(&t.scoring_criteria),
    id: t.id,
    title: t.title,
    description: t.description,
    reading_time: t.reading_time,
    writing_time: t.writing_time,
    total_points: t.total_points,
    difficulty: t.difficulty,
    category: t.category,
    participants: t.participants,
    essay_text: t.essay_text,
    created_at: t.created_at,
  }
}

fn criteria_score_out(c: CriteriaScore) -> CriteriaScoreOut {
  CriteriaScoreOut {
    criteria_name: c.criteria_name,
    score: c.score,
    max_score: c.max_score,
    comment: c.comment,
    reasoning: c.reasoning,
  }
}

fn question_score_out(q: QuestionScore) -> QuestionScoreOut {
  QuestionScoreOut {
    question_num: q.question_num,
    score: q.score,
    max_score: q.max_score,
    percentage: q.percentage,
    criteria_scores: q.criteria_scores.into_iter().map(criteria_score_out).collect(),
    comment: q.comment,
    reasoning: q.reasoning,
  }
}

pub fn to_result_out(r: ScoringResult) -> ResultOut {
  ResultOut {
    id: r.id,
    submission_id: r.submission_id,
    test_id: r.test_id,
    test_title: r.test_title,
    total_score: r.total_score,
    max_score: r.max_score,
    percentage: r.percentage,
    details: r.details.into_iter().map(question_score_out).collect(),
    feedback: r.feedback,
    scored_by: r.scored_by,
    created_at: r.created_at,
    expires_at: r.expires_at,
  }
}

pub fn to_submit_out(r: SubmissionReceipt) -> SubmitOut {
  SubmitOut {
    result_id: r.result_id,
    submission_id: r.submission_id,
    total_score: r.total_score,
    max_score: r.max_score,
    percentage: r.percentage,
    message: r.message,
  }
}

pub fn to_drafts(answers: Vec<AnswerIn>) -> Vec<AnswerDraft> {
  answers
    .into_iter()
    .map(|a| AnswerDraft { question_id: a.question_id, content: a.content })
    .collect()
}
