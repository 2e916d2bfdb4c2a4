//! Test data used across suites.

use essay_scoring_backend::domain::{EssayTest, Question};
use essay_scoring_backend::seeds::{canonical_test, CANONICAL_TEST_ID};
use essay_scoring_backend::workflow::{AnswerDraft, SubmissionRequest};

pub struct Fixtures;

impl Fixtures {
  pub const TEST_ID: &'static str = CANONICAL_TEST_ID;
  pub const THREE_QUESTION_TEST_ID: &'static str = "three-questions";

  /// `n` code points of Japanese filler with no keywords or signal markers.
  pub fn text(n: usize) -> String {
    "あ".repeat(n)
  }

  pub fn request(test_id: &str, contents: &[String]) -> SubmissionRequest {
    SubmissionRequest {
      test_id: test_id.to_string(),
      user_id: Some("student-1".into()),
      answers: contents
        .iter()
        .enumerate()
        .map(|(i, c)| AnswerDraft { question_id: format!("q{}", i + 1), content: c.clone() })
        .collect(),
    }
  }

  /// 120 + 700 filler characters: 20 + 60 = 80.
  pub fn excellent_request() -> SubmissionRequest {
    Self::request(Self::TEST_ID, &[Self::text(120), Self::text(700)])
  }

  pub fn three_question_test() -> EssayTest {
    let mut test = canonical_test();
    test.id = Self::THREE_QUESTION_TEST_ID.into();
    test.title = "三問構成".into();
    test.questions.push(Question {
      id: "three-q3".into(),
      number: 3,
      title: "問3".into(),
      description: String::new(),
      points: 10,
      character_limit: String::new(),
    });
    test
  }
}
