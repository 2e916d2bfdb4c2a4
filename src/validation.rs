//! Structural checks on a submission before anything is persisted.

use crate::domain::Question;
use crate::error::ValidationError;

/// One answer per question, nothing more. Empty or oversized answers are
/// accepted here and simply land in a low length bucket when scored.
pub fn validate_answer_count<A>(questions: &[Question], answers: &[A]) -> Result<(), ValidationError> {
  if questions.len() != answers.len() {
    return Err(ValidationError::AnswerCount {
      expected: questions.len(),
      actual: answers.len(),
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn questions(n: u32) -> Vec<Question> {
    (1..=n)
      .map(|number| Question {
        id: format!("q{number}"),
        number,
        title: String::new(),
        description: String::new(),
        points: 10,
        character_limit: String::new(),
      })
      .collect()
  }

  #[test]
  fn equal_counts_pass_even_with_empty_content() {
    assert!(validate_answer_count(&questions(2), &["", ""]).is_ok());
  }

  #[test]
  fn mismatch_reports_expected_and_actual() {
    assert_eq!(
      validate_answer_count(&questions(2), &["only"]),
      Err(ValidationError::AnswerCount { expected: 2, actual: 1 })
    );
    assert_eq!(
      validate_answer_count(&questions(2), &["a", "b", "c"]),
      Err(ValidationError::AnswerCount { expected: 2, actual: 3 })
    );
    assert_eq!(
      validate_answer_count::<&str>(&questions(2), &[]),
      Err(ValidationError::AnswerCount { expected: 2, actual: 0 })
    );
  }
}
