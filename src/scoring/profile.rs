//! Scoring tables: length buckets, content bonuses, criteria weights and feedback text.
//!
//! A `ScoringProfile` is plain data. The engine never hardcodes a threshold or a
//! keyword; everything comes from here. `ScoringProfile::default()` is the canonical
//! two-question profile (summary 30 + opinion 70). A different profile can be
//! supplied from TOML under `[scoring]` (see `config.rs`).

use serde::{Deserialize, Serialize};

/// One row of a length table. Matches when `min <= length` and, if set, `length <= max`.
/// Rows are evaluated top-down; the first match wins.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LengthBucket {
  pub min: usize,
  #[serde(default)] pub max: Option<usize>,
  pub base_score: u32,
  pub comment: String,
}

impl LengthBucket {
  pub fn matches(&self, length: usize) -> bool {
    length >= self.min && self.max.map_or(true, |max| length <= max)
  }
}

/// A named group of marker phrases. Presence of any one marker sets the signal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Signal {
  pub name: String,
  pub markers: Vec<String>,
}

/// How extra points are earned from the content itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBonus {
  /// Each distinct keyword present earns `points_per_match`, total capped at `cap`.
  Keywords {
    terms: Vec<String>,
    points_per_match: u32,
    cap: u32,
  },
  /// Each signal whose markers appear earns `points_per_signal`, once.
  Signals {
    points_per_signal: u32,
    signals: Vec<Signal>,
  },
}

/// A rubric dimension that receives `round(question_score * weight)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CriterionWeight {
  /// Stable identifier, e.g. `main_point_comprehension`.
  pub key: String,
  /// Display name written into results.
  pub name: String,
  pub weight: f64,
  pub max_score: u32,
  pub comment: String,
  pub reasoning: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionRubric {
  pub number: u32,
  /// Role of the question, e.g. "summary" or "opinion".
  pub role: String,
  pub max_score: u32,
  /// Inclusive length range considered ideal; drives the feedback remark.
  pub ideal_min: usize,
  pub ideal_max: usize,
  /// Reasoning string; `{length}` is replaced with the measured length.
  pub reasoning_template: String,
  pub buckets: Vec<LengthBucket>,
  pub bonus: ContentBonus,
  pub criteria: Vec<CriterionWeight>,
  /// Feedback section header, e.g. "【問1について】".
  pub feedback_heading: String,
  pub feedback_in_range: String,
  pub feedback_out_of_range: String,
}

/// Overall assessment band derived from the total score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackBand {
  Excellent,
  Good,
  Standard,
  NeedsImprovement,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BandRule {
  pub min_score: u32,
  pub band: FeedbackBand,
  pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedbackTemplate {
  pub overall_heading: String,
  /// Evaluated top-down by `min_score`; the last rule should have `min_score = 0`.
  pub bands: Vec<BandRule>,
  /// Line written under each question heading; `{length}` is substituted.
  pub length_line: String,
  pub improvement_heading: String,
  pub improvement_points: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoringProfile {
  /// Tag written to `ScoringResult::scored_by`.
  pub scored_by: String,
  /// Denominator of the overall percentage, independent of the test's declared total.
  pub max_total: u32,
  pub questions: Vec<QuestionRubric>,
  pub feedback: FeedbackTemplate,
}

/// Problems found by `ScoringProfile::validate`.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ProfileError {
  #[error("profile has no questions")]
  Empty,
  #[error("question {question}: length table is empty or lacks a catch-all last row")]
  NoCatchAllBucket { question: u32 },
  #[error("question {question}: criteria weights sum to {sum}, expected 1.0")]
  WeightSum { question: u32, sum: f64 },
  #[error("question numbers must run 1..=n, found {found} at position {position}")]
  QuestionOrder { position: usize, found: u32 },
  #[error("feedback bands are empty or lack a min_score = 0 row")]
  NoFallbackBand,
}

impl ScoringProfile {
  pub fn validate(&self) -> Result<(), ProfileError> {
    if self.questions.is_empty() {
      return Err(ProfileError::Empty);
    }
    for (idx, q) in self.questions.iter().enumerate() {
      if q.number as usize != idx + 1 {
        return Err(ProfileError::QuestionOrder { position: idx, found: q.number });
      }
      let catch_all = q.buckets.last().map_or(false, |b| b.min == 0 && b.max.is_none());
      if !catch_all {
        return Err(ProfileError::NoCatchAllBucket { question: q.number });
      }
      let sum: f64 = q.criteria.iter().map(|c| c.weight).sum();
      if (sum - 1.0).abs() > 0.01 {
        return Err(ProfileError::WeightSum { question: q.number, sum });
      }
    }
    if !self.feedback.bands.iter().any(|b| b.min_score == 0) {
      return Err(ProfileError::NoFallbackBand);
    }
    Ok(())
  }

  /// Sum of per-question maxima. Equals `max_total` for the canonical profile.
  pub fn question_max_sum(&self) -> u32 {
    self.questions.iter().map(|q| q.max_score).sum()
  }
}

fn bucket(min: usize, max: Option<usize>, base_score: u32, comment: &str) -> LengthBucket {
  LengthBucket { min, max, base_score, comment: comment.into() }
}

fn criterion(key: &str, name: &str, weight: f64, max_score: u32, comment: &str, reasoning: &str) -> CriterionWeight {
  CriterionWeight {
    key: key.into(),
    name: name.into(),
    weight,
    max_score,
    comment: comment.into(),
    reasoning: reasoning.into(),
  }
}

fn signal(name: &str, markers: &[&str]) -> Signal {
  Signal { name: name.into(), markers: markers.iter().map(|m| m.to_string()).collect() }
}

fn summary_question() -> QuestionRubric {
  QuestionRubric {
    number: 1,
    role: "summary".into(),
    max_score: 30,
    ideal_min: 150,
    ideal_max: 250,
    reasoning_template: "文字数: {length}字。要約問題では150-250字程度が適切です。".into(),
    buckets: vec![
      bucket(150, Some(250), 25, "適切な文字数で要約されています。"),
      bucket(100, None, 20, "やや短めですが、要点は押さえられています。"),
      bucket(50, None, 15, "短すぎます。もう少し詳しく要約してください。"),
      bucket(0, None, 10, "文字数が不足しています。"),
    ],
    bonus: ContentBonus::Keywords {
      terms: ["匿名性", "SNS", "表現の自由", "誹謗中傷", "責任", "実名制"]
        .iter()
        .map(|t| t.to_string())
        .collect(),
      points_per_match: 1,
      cap: 5,
    },
    criteria: vec![
      criterion(
        "main_point_comprehension", "要点把握", 0.40, 12,
        "課題文の主要な論点を理解できています。", "文字数と内容から判定しました。",
      ),
      criterion(
        "selection_and_organization", "要点の整理・取捨選択", 0.35, 10,
        "重要な論点を適切に選択できています。", "要約の構成から判定しました。",
      ),
      criterion(
        "written_expression", "文章表現", 0.25, 8,
        "文章表現は概ね適切です。", "文字数と構成から判定しました。",
      ),
    ],
    feedback_heading: "【問1について】".into(),
    feedback_in_range: "適切な文字数で要約されています。".into(),
    feedback_out_of_range: "要約問題では150-250字程度が適切です。".into(),
  }
}

fn opinion_question() -> QuestionRubric {
  QuestionRubric {
    number: 2,
    role: "opinion".into(),
    max_score: 70,
    ideal_min: 600,
    ideal_max: 800,
    reasoning_template: "文字数: {length}字。意見記述問題では600-800字程度が適切です。".into(),
    buckets: vec![
      bucket(600, Some(800), 60, "適切な文字数で論述されています。"),
      bucket(400, None, 50, "やや短めですが、論点は整理されています。"),
      bucket(200, None, 40, "短すぎます。もう少し詳しく論述してください。"),
      bucket(100, None, 30, "文字数が大幅に不足しています。"),
      bucket(0, None, 20, "文字数が大幅に不足しています。"),
    ],
    bonus: ContentBonus::Signals {
      points_per_signal: 2,
      signals: vec![
        signal("contrast", &["一方で", "しかし", "また"]),
        signal("example", &["例えば", "具体的に"]),
        signal("conclusion", &["結論", "以上", "このように"]),
        signal("opinion", &["私は", "私の考え", "思う"]),
        signal("justification", &["なぜなら", "理由", "根拠"]),
      ],
    },
    criteria: vec![
      criterion(
        "comprehension_of_source", "課題文の理解", 0.20, 14,
        "課題文の内容を適切に理解しています。", "論述の内容から判定しました。",
      ),
      criterion(
        "clarity_of_position", "自分自身の明確な意見・立場", 0.25, 17,
        "自分の立場が明確に示されています。", "意見の明確性から判定しました。",
      ),
      criterion(
        "logical_reasoning", "論理的思考力", 0.30, 21,
        "論理的な構成で論述されています。", "論理的構成から判定しました。",
      ),
      criterion(
        "originality", "独創性", 0.15, 10,
        "独自の視点が含まれています。", "内容の独創性から判定しました。",
      ),
      criterion(
        "relevance", "適合性", 0.10, 8,
        "課題に適合した内容です。", "課題への適合性から判定しました。",
      ),
    ],
    feedback_heading: "【問2について】".into(),
    feedback_in_range: "適切な文字数で論述されています。".into(),
    feedback_out_of_range: "意見記述問題では600-800字程度が適切です。".into(),
  }
}

fn default_feedback() -> FeedbackTemplate {
  FeedbackTemplate {
    overall_heading: "【総合評価】".into(),
    bands: vec![
      BandRule {
        min_score: 80,
        band: FeedbackBand::Excellent,
        text: "優秀な答案です。論理的構成と内容の両面で高い水準に達しています。".into(),
      },
      BandRule {
        min_score: 60,
        band: FeedbackBand::Good,
        text: "良好な答案です。基本的な論点は押さえられていますが、さらなる向上の余地があります。".into(),
      },
      BandRule {
        min_score: 40,
        band: FeedbackBand::Standard,
        text: "標準的な答案です。基本的な理解は示されていますが、論述の深化が必要です。".into(),
      },
      BandRule {
        min_score: 0,
        band: FeedbackBand::NeedsImprovement,
        text: "改善が必要な答案です。課題文の理解と論述の構成を見直してください。".into(),
      },
    ],
    length_line: "文字数: {length}字".into(),
    improvement_heading: "【改善のポイント】".into(),
    improvement_points: vec![
      "論理的な構成を意識してください（序論・本論・結論）".into(),
      "具体例を用いて論述を補強してください".into(),
      "自分の意見を明確に示してください".into(),
      "課題文の内容を踏まえた論述を心がけてください".into(),
    ],
  }
}

impl Default for ScoringProfile {
  fn default() -> Self {
    Self {
      scored_by: "fallback".into(),
      max_total: 100,
      questions: vec![summary_question(), opinion_question()],
      feedback: default_feedback(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_profile_is_valid_and_totals_100() {
    let p = ScoringProfile::default();
    assert_eq!(p.validate(), Ok(()));
    assert_eq!(p.max_total, 100);
    assert_eq!(p.question_max_sum(), 100);
    assert_eq!(p.questions[0].max_score, 30);
    assert_eq!(p.questions[1].max_score, 70);
  }

  #[test]
  fn default_weight_tables_match_rubric() {
    let p = ScoringProfile::default();
    let q1: Vec<(f64, u32)> = p.questions[0].criteria.iter().map(|c| (c.weight, c.max_score)).collect();
    assert_eq!(q1, vec![(0.40, 12), (0.35, 10), (0.25, 8)]);
    let q2: Vec<(f64, u32)> = p.questions[1].criteria.iter().map(|c| (c.weight, c.max_score)).collect();
    assert_eq!(q2, vec![(0.20, 14), (0.25, 17), (0.30, 21), (0.15, 10), (0.10, 8)]);
  }

  #[test]
  fn bucket_bounds_are_inclusive() {
    let b = bucket(150, Some(250), 25, "");
    assert!(!b.matches(149));
    assert!(b.matches(150));
    assert!(b.matches(250));
    assert!(!b.matches(251));
    assert!(bucket(0, None, 10, "").matches(usize::MAX));
  }

  #[test]
  fn validate_rejects_bad_weights() {
    let mut p = ScoringProfile::default();
    p.questions[0].criteria[0].weight = 0.9;
    assert!(matches!(p.validate(), Err(ProfileError::WeightSum { question: 1, .. })));
  }

  #[test]
  fn validate_rejects_missing_catch_all() {
    let mut p = ScoringProfile::default();
    p.questions[1].buckets.pop();
    assert_eq!(p.validate(), Err(ProfileError::NoCatchAllBucket { question: 2 }));
  }

  #[test]
  fn profile_parses_from_toml() {
    let src = r#"
scored_by = "custom"
max_total = 10

[feedback]
overall_heading = "Overall"
length_line = "Length: {length}"
improvement_heading = "Next steps"
improvement_points = ["Be concise"]

[[feedback.bands]]
min_score = 0
band = "needs_improvement"
text = "Keep going."

[[questions]]
number = 1
role = "short"
max_score = 10
ideal_min = 5
ideal_max = 20
reasoning_template = "{length} chars"
feedback_heading = "Q1"
feedback_in_range = "ok"
feedback_out_of_range = "aim for 5-20"

[questions.bonus]
kind = "keywords"
terms = ["rust"]
points_per_match = 2
cap = 2

[[questions.buckets]]
min = 5
max = 20
base_score = 8
comment = "good"

[[questions.buckets]]
min = 0
base_score = 2
comment = "short"

[[questions.criteria]]
key = "all"
name = "All"
weight = 1.0
max_score = 10
comment = "-"
reasoning = "-"
"#;
    let p: ScoringProfile = toml::from_str(src).expect("profile should parse");
    assert_eq!(p.validate(), Ok(()));
    assert_eq!(p.scored_by, "custom");
    assert_eq!(p.questions[0].buckets[1].max, None);
    assert!(matches!(p.questions[0].bonus, ContentBonus::Keywords { cap: 2, .. }));
  }
}
