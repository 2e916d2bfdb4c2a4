//! Narrative feedback: overall banner, one section per question, improvement footer.

use crate::scoring::profile::{BandRule, FeedbackBand, FeedbackTemplate, QuestionRubric};
use crate::util::fill_template;

/// Pick the first band whose `min_score` the total reaches.
pub fn select_band(template: &FeedbackTemplate, total_score: u32) -> Option<&BandRule> {
  template.bands.iter().find(|rule| total_score >= rule.min_score)
}

/// Compose feedback for a graded submission.
///
/// `lengths` pairs each question rubric with the measured answer length, in
/// question order. Sections are written in the fixed order: banner, per-question
/// sections, improvement points.
pub fn compose_feedback(
  template: &FeedbackTemplate,
  total_score: u32,
  lengths: &[(&QuestionRubric, usize)],
) -> (Option<FeedbackBand>, String) {
  let mut out = String::new();

  out.push_str(&template.overall_heading);
  out.push('\n');
  let band = select_band(template, total_score);
  if let Some(rule) = band {
    out.push_str(&rule.text);
    out.push('\n');
  }
  out.push('\n');

  for (rubric, length) in lengths {
    out.push_str(&rubric.feedback_heading);
    out.push('\n');
    out.push_str(&fill_template(&template.length_line, &[("length", &length.to_string())]));
    out.push('\n');
    let in_range = *length >= rubric.ideal_min && *length <= rubric.ideal_max;
    if in_range {
      out.push_str(&rubric.feedback_in_range);
    } else {
      out.push_str(&rubric.feedback_out_of_range);
    }
    out.push_str("\n\n");
  }

  out.push_str(&template.improvement_heading);
  out.push('\n');
  for point in &template.improvement_points {
    out.push('・');
    out.push_str(point);
    out.push('\n');
  }

  (band.map(|b| b.band), out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scoring::profile::ScoringProfile;

  fn compose(total: u32, l1: usize, l2: usize) -> (Option<FeedbackBand>, String) {
    let p = ScoringProfile::default();
    compose_feedback(&p.feedback, total, &[(&p.questions[0], l1), (&p.questions[1], l2)])
  }

  #[test]
  fn band_thresholds_are_inclusive_lower_bounds() {
    assert_eq!(compose(100, 0, 0).0, Some(FeedbackBand::Excellent));
    assert_eq!(compose(80, 0, 0).0, Some(FeedbackBand::Excellent));
    assert_eq!(compose(79, 0, 0).0, Some(FeedbackBand::Good));
    assert_eq!(compose(60, 0, 0).0, Some(FeedbackBand::Good));
    assert_eq!(compose(59, 0, 0).0, Some(FeedbackBand::Standard));
    assert_eq!(compose(40, 0, 0).0, Some(FeedbackBand::Standard));
    assert_eq!(compose(39, 0, 0).0, Some(FeedbackBand::NeedsImprovement));
    assert_eq!(compose(0, 0, 0).0, Some(FeedbackBand::NeedsImprovement));
  }

  #[test]
  fn sections_appear_in_fixed_order() {
    let (_, text) = compose(85, 200, 700);
    let overall = text.find("【総合評価】").unwrap();
    let banner = text.find("優秀な答案です").unwrap();
    let q1 = text.find("【問1について】").unwrap();
    let q2 = text.find("【問2について】").unwrap();
    let footer = text.find("【改善のポイント】").unwrap();
    assert!(overall < banner && banner < q1 && q1 < q2 && q2 < footer);
  }

  #[test]
  fn question_sections_report_length_and_range() {
    let (_, text) = compose(50, 200, 300);
    assert!(text.contains("【問1について】\n文字数: 200字\n適切な文字数で要約されています。\n"));
    assert!(text.contains("【問2について】\n文字数: 300字\n意見記述問題では600-800字程度が適切です。\n"));

    let (_, text) = compose(50, 251, 800);
    assert!(text.contains("文字数: 251字\n要約問題では150-250字程度が適切です。"));
    assert!(text.contains("文字数: 800字\n適切な文字数で論述されています。"));
  }

  #[test]
  fn footer_lists_four_improvement_points() {
    let (_, text) = compose(10, 0, 0);
    let footer = &text[text.find("【改善のポイント】").unwrap()..];
    assert_eq!(footer.lines().filter(|l| l.starts_with('・')).count(), 4);
    assert!(footer.contains("具体例"));
    assert!(text.contains("改善が必要な答案です"));
  }
}
