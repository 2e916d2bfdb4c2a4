//! Domain models used by the backend: essay tests, submissions and scoring results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a submission. Created `Pending`, then moved once to a terminal state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
  #[default]
  Pending,
  Scored,
  Failed,
}

impl SubmissionStatus {
  pub fn is_terminal(self) -> bool {
    !matches!(self, SubmissionStatus::Pending)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      SubmissionStatus::Pending => "pending",
      SubmissionStatus::Scored => "scored",
      SubmissionStatus::Failed => "failed",
    }
  }
}

/// Reference material a grader would use; returned with the full test only.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ScoringCriteria {
  #[serde(default)] pub main_thesis: String,
  #[serde(default)] pub key_points: Vec<String>,
  #[serde(default)] pub question2_topic: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
  pub id: String,
  pub number: u32,
  #[serde(default)] pub title: String,
  #[serde(default)] pub description: String,
  pub points: u32,
  /// Free-text hint shown to the test-taker, e.g. "150-250字".
  #[serde(default)] pub character_limit: String,
}

/// A fixed test definition held in the test bank.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EssayTest {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub reading_time: String,
  #[serde(default)] pub writing_time: String,
  #[serde(default)] pub total_points: u32,
  #[serde(default)] pub difficulty: String,
  #[serde(default)] pub category: String,
  #[serde(default)] pub participants: u32,
  #[serde(default)] pub essay_text: String,
  pub questions: Vec<Question>,
  #[serde(default)] pub scoring_criteria: ScoringCriteria,
  #[serde(default = "Utc::now")] pub created_at: DateTime<Utc>,
}

impl EssayTest {
  /// Sort questions by number and check they run 1..=n without gaps.
  /// Returns the offending number on failure.
  pub fn normalize_questions(&mut self) -> Result<(), u32> {
    self.questions.sort_by_key(|q| q.number);
    for (idx, q) in self.questions.iter().enumerate() {
      let expected = idx as u32 + 1;
      if q.number != expected {
        return Err(q.number);
      }
    }
    Ok(())
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Answer {
  pub id: String,
  pub submission_id: String,
  pub question_id: String,
  pub content: String,
  /// Code points in `content`, fixed when the submission is built.
  pub word_count: usize,
}

/// One attempt by a user against a test. Owns its answers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Submission {
  pub id: String,
  pub test_id: String,
  #[serde(default)] pub user_id: Option<String>,
  pub answers: Vec<Answer>,
  pub status: SubmissionStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CriteriaScore {
  pub criteria_name: String,
  pub score: u32,
  pub max_score: u32,
  pub comment: String,
  pub reasoning: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionScore {
  pub question_num: u32,
  pub score: u32,
  pub max_score: u32,
  pub percentage: f64,
  pub criteria_scores: Vec<CriteriaScore>,
  pub comment: String,
  pub reasoning: String,
}

/// Outcome of grading one submission. References the submission and test by id only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoringResult {
  pub id: String,
  pub submission_id: String,
  pub test_id: String,
  pub test_title: String,
  pub total_score: u32,
  pub max_score: u32,
  pub percentage: f64,
  pub details: Vec<QuestionScore>,
  pub feedback: String,
  pub scored_by: String,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl ScoringResult {
  /// Readers must treat the result as absent once `now` passes `expires_at`.
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at
  }
}
