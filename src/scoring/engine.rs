//! Heuristic scoring: length bucket + content bonus, then proportional criteria split.
//!
//! Everything here is a pure function of the profile and the answer text. No clock,
//! no ids, no I/O; the workflow stamps those on afterwards.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{CriteriaScore, QuestionScore, Submission};
use crate::error::ScoringError;
use crate::scoring::feedback::compose_feedback;
use crate::scoring::profile::{ContentBonus, FeedbackBand, QuestionRubric, ScoringProfile};
use crate::util::{char_len, fill_template};

/// Graded outcome of one submission, before lifecycle metadata is attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Scorecard {
  pub total_score: u32,
  pub max_score: u32,
  pub percentage: f64,
  pub details: Vec<QuestionScore>,
  pub feedback: String,
  pub band: Option<FeedbackBand>,
  pub scored_by: String,
}

/// Grading seam used by the workflow. Implementations must be pure and thread-safe.
pub trait Scorer: Send + Sync {
  fn score(&self, submission: &Submission) -> Result<Scorecard, ScoringError>;
}

/// Deterministic fallback scorer driven by a `ScoringProfile`.
#[derive(Clone, Debug)]
pub struct HeuristicScorer {
  profile: Arc<ScoringProfile>,
}

impl HeuristicScorer {
  pub fn new(profile: Arc<ScoringProfile>) -> Self {
    Self { profile }
  }

  /// Grade answer texts bound positionally to the profile's questions.
  pub fn score_contents(&self, contents: &[&str]) -> Result<Scorecard, ScoringError> {
    let profile = &*self.profile;
    if contents.len() != profile.questions.len() {
      return Err(ScoringError::UnsupportedShape {
        expected: profile.questions.len(),
        actual: contents.len(),
      });
    }

    let mut details = Vec::with_capacity(contents.len());
    let mut lengths = Vec::with_capacity(contents.len());
    for (rubric, content) in profile.questions.iter().zip(contents) {
      let graded = score_question(rubric, content)?;
      lengths.push((rubric, graded.length));
      details.push(graded.detail);
    }

    let total_score: u32 = details.iter().map(|d| d.score).sum();
    let max_score = profile.max_total;
    let percentage = percent(total_score, max_score);
    let (band, feedback) = compose_feedback(&profile.feedback, total_score, &lengths);

    Ok(Scorecard {
      total_score,
      max_score,
      percentage,
      details,
      feedback,
      band,
      scored_by: profile.scored_by.clone(),
    })
  }
}

impl Scorer for HeuristicScorer {
  #[instrument(level = "debug", skip(self, submission), fields(submission_id = %submission.id, answers = submission.answers.len()))]
  fn score(&self, submission: &Submission) -> Result<Scorecard, ScoringError> {
    let contents: Vec<&str> = submission.answers.iter().map(|a| a.content.as_str()).collect();
    let card = self.score_contents(&contents)?;
    debug!(target: "scoring", submission_id = %submission.id, total = card.total_score, max = card.max_score, "Heuristic scoring done");
    Ok(card)
  }
}

/// Intermediate values for one question; `detail` is what ends up in the result.
#[derive(Clone, Debug, PartialEq)]
pub struct GradedQuestion {
  pub length: usize,
  pub base_score: u32,
  pub bonus: u32,
  pub detail: QuestionScore,
}

pub fn score_question(rubric: &QuestionRubric, content: &str) -> Result<GradedQuestion, ScoringError> {
  let length = char_len(content);
  let bucket = rubric
    .buckets
    .iter()
    .find(|b| b.matches(length))
    .ok_or(ScoringError::NoLengthBucket { question: rubric.number, length })?;

  let bonus = content_bonus(&rubric.bonus, content);
  let score = (bucket.base_score + bonus).min(rubric.max_score);
  let reasoning = fill_template(&rubric.reasoning_template, &[("length", &length.to_string())]);

  debug!(
    target: "scoring",
    question = rubric.number, role = %rubric.role, length, base = bucket.base_score, bonus, score,
    "Question scored"
  );

  Ok(GradedQuestion {
    length,
    base_score: bucket.base_score,
    bonus,
    detail: QuestionScore {
      question_num: rubric.number,
      score,
      max_score: rubric.max_score,
      percentage: percent(score, rubric.max_score),
      criteria_scores: allocate_criteria(rubric, score),
      comment: bucket.comment.clone(),
      reasoning,
    },
  })
}

/// Case-sensitive substring checks; repeated occurrences of one term count once.
pub fn content_bonus(bonus: &ContentBonus, content: &str) -> u32 {
  match bonus {
    ContentBonus::Keywords { terms, points_per_match, cap } => {
      let hits = terms.iter().filter(|t| content.contains(t.as_str())).count() as u32;
      (hits * points_per_match).min(*cap)
    }
    ContentBonus::Signals { points_per_signal, signals } => {
      let raised = signals
        .iter()
        .filter(|s| s.markers.iter().any(|m| content.contains(m.as_str())))
        .count() as u32;
      raised * points_per_signal
    }
  }
}

/// Split a question score over its criteria. Each share is rounded on its own,
/// so the parts may differ from the whole by the rounding of each criterion.
pub fn allocate_criteria(rubric: &QuestionRubric, question_score: u32) -> Vec<CriteriaScore> {
  rubric
    .criteria
    .iter()
    .map(|c| CriteriaScore {
      criteria_name: c.name.clone(),
      score: (question_score as f64 * c.weight).round() as u32,
      max_score: c.max_score,
      comment: c.comment.clone(),
      reasoning: c.reasoning.clone(),
    })
    .collect()
}

fn percent(score: u32, max: u32) -> f64 {
  if max == 0 {
    return 0.0;
  }
  score as f64 / max as f64 * 100.0
}
