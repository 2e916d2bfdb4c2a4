//! Built-in test bank so the service is usable without any config file.

use chrono::{TimeZone, Utc};

use crate::domain::{EssayTest, Question, ScoringCriteria};

pub const CANONICAL_TEST_ID: &str = "essay-test-1";

const ESSAY_TEXT: &str = "\
インターネット上の匿名性は、誰もが社会的な立場や属性に縛られずに発言できる環境を生み出した。\
少数派の意見や内部告発など、実名では口にしにくい声が表に出るようになったのは、匿名性の大きな功績である。

一方で、匿名であることは発言に対する責任感を薄れさせる。SNSでは根拠のない噂や誹謗中傷が瞬く間に拡散し、\
被害を受けた人が深刻な精神的苦痛を負う事例が後を絶たない。こうした状況を受けて、実名制の導入を求める声も強まっている。

しかし、実名制は表現の自由を萎縮させる危険をはらむ。発言者が特定されることを恐れて、権力への批判や\
社会的に弱い立場からの訴えが封じられてしまえば、匿名性が本来守ってきた価値そのものが失われる。

求められているのは、匿名性を一律に認めるか否定するかという二者択一ではない。表現の自由を守りつつ、\
他者の権利を侵害する発言には責任を問える仕組みを、プラットフォーム、法制度、利用者それぞれの水準で整えることである。";

/// The canonical two-question test: a summary (30 points) and an opinion essay (70 points).
pub fn canonical_test() -> EssayTest {
  EssayTest {
    id: CANONICAL_TEST_ID.into(),
    title: "SNSの匿名性について".into(),
    description: "SNSにおける匿名性の功罪を論じた文章を読み、要約と意見論述を行います。".into(),
    reading_time: "10分".into(),
    writing_time: "50分".into(),
    total_points: 100,
    difficulty: "中級".into(),
    category: "社会".into(),
    participants: 0,
    essay_text: ESSAY_TEXT.into(),
    questions: vec![
      Question {
        id: "essay-test-1-q1".into(),
        number: 1,
        title: "問1 要約".into(),
        description: "本文の主張を150字以上250字以内で要約しなさい。".into(),
        points: 30,
        character_limit: "150-250字".into(),
      },
      Question {
        id: "essay-test-1-q2".into(),
        number: 2,
        title: "問2 意見論述".into(),
        description: "SNSの匿名性を維持すべきか否かについて、本文を踏まえてあなたの考えを600字以上800字以内で述べなさい。".into(),
        points: 70,
        character_limit: "600-800字".into(),
      },
    ],
    scoring_criteria: ScoringCriteria {
      main_thesis: "匿名性は表現の自由を支える一方で責任の所在を曖昧にするため、一律の是非ではなく責任を問える仕組みの整備が求められる。".into(),
      key_points: vec![
        "匿名性は少数派や内部告発の声を可能にする".into(),
        "匿名性は責任感を薄れさせ誹謗中傷の拡散を招く".into(),
        "実名制は表現の自由を萎縮させる危険がある".into(),
        "表現の自由と責任追及を両立させる制度設計が必要".into(),
      ],
      question2_topic: "SNSの匿名性を維持すべきか、制限すべきか".into(),
    },
    created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now),
  }
}

/// Tests shipped with the binary, in listing order.
pub fn builtin_tests() -> Vec<EssayTest> {
  vec![canonical_test()]
}
