//! 试卷模板
//!
//! 模板只描述题目内容，不带ID；装载时由会话的计数器分配新ID

use crate::error::{DraftError, DraftResult};
use crate::models::paper::{score_sum, PaperDraft, DEFAULT_DURATION, TOTAL_OVERFLOW_MESSAGE};
use crate::models::question::{Difficulty, Question, QuestionId, QuestionType};
use crate::models::subject::Subject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 模板中的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub content: String,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answers: BTreeSet<usize>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl TemplateQuestion {
    fn new(kind: QuestionType, content: &str, score: u32, difficulty: Difficulty) -> Self {
        Self {
            kind,
            content: content.to_string(),
            score: Some(score),
            options: Vec::new(),
            correct_answers: BTreeSet::new(),
            explanation: String::new(),
            difficulty,
        }
    }

    fn with_options(mut self, options: &[&str], answer: usize) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self.correct_answers = BTreeSet::from([answer]);
        self
    }

    fn into_question(self, id: QuestionId) -> Question {
        let mut question = Question::new(id, self.kind);
        question.content = self.content;
        if let Some(score) = self.score {
            question.score = score;
        }
        if self.kind.has_options() && !self.options.is_empty() {
            question.options = self.options;
        }
        question.correct_answers = self.correct_answers;
        question.explanation = self.explanation;
        question.difficulty = self.difficulty;
        question
    }
}

/// 试卷模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperTemplate {
    /// 模板标识，如 `math-basic`
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: Subject,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<TemplateQuestion>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION
}

impl PaperTemplate {
    pub const BUILTIN_KEYS: &'static [&'static str] = &["math-basic", "english-basic", "empty"];

    /// 内置模板；未知标识回退为空白模板
    pub fn builtin(key: &str) -> Self {
        match key {
            "math-basic" => Self::math_basic(),
            "english-basic" => Self::english_basic(),
            _ => Self::empty(),
        }
    }

    pub fn empty() -> Self {
        Self {
            key: "empty".to_string(),
            name: String::new(),
            subject: Subject::Unset,
            duration: DEFAULT_DURATION,
            difficulty: Difficulty::Medium,
            description: String::new(),
            questions: Vec::new(),
        }
    }

    fn math_basic() -> Self {
        Self {
            key: "math-basic".to_string(),
            name: "数学基础模板".to_string(),
            subject: Subject::Math,
            duration: 120,
            difficulty: Difficulty::Medium,
            description: "数学基础知识测试".to_string(),
            questions: vec![
                TemplateQuestion::new(
                    QuestionType::Choice,
                    "下列哪个数是质数？",
                    4,
                    Difficulty::Easy,
                )
                .with_options(&["4", "6", "7", "8"], 2),
                TemplateQuestion::new(
                    QuestionType::Fill,
                    "如果 x + 3 = 7，那么 x = ____。",
                    6,
                    Difficulty::Easy,
                ),
                TemplateQuestion::new(
                    QuestionType::Essay,
                    "解方程：2x² - 5x + 2 = 0",
                    15,
                    Difficulty::Medium,
                ),
            ],
        }
    }

    fn english_basic() -> Self {
        Self {
            key: "english-basic".to_string(),
            name: "英语基础模板".to_string(),
            subject: Subject::English,
            duration: 90,
            difficulty: Difficulty::Medium,
            description: "英语基础能力测试".to_string(),
            questions: vec![
                TemplateQuestion::new(
                    QuestionType::Choice,
                    "Choose the correct word: I ____ to school every day.",
                    3,
                    Difficulty::Easy,
                )
                .with_options(&["go", "goes", "going", "went"], 0),
                TemplateQuestion::new(
                    QuestionType::Fill,
                    "Complete the sentence: She is ____ (tall) than her sister.",
                    5,
                    Difficulty::Medium,
                ),
                TemplateQuestion::new(
                    QuestionType::Composition,
                    "Write a short essay (100-150 words) about your favorite hobby.",
                    25,
                    Difficulty::Medium,
                ),
            ],
        }
    }

    /// 检查模板是否能生成合法的题目
    pub fn validate(&self) -> DraftResult<()> {
        let mut violations = Vec::new();

        if self.duration == 0 {
            violations.push(format!("模板 {}: 考试时长必须大于0", self.key));
        }

        let mut scores = Vec::with_capacity(self.questions.len());
        for (index, tq) in self.questions.iter().enumerate() {
            if !self.subject.allows(tq.kind) {
                violations.push(format!(
                    "模板 {} 第 {} 题: {}不允许{}",
                    self.key,
                    index + 1,
                    self.subject.name(),
                    tq.kind.name()
                ));
            }
            let question = tq.clone().into_question(0);
            for violation in question.shape_violations() {
                violations.push(format!("模板 {} 第 {} 题: {}", self.key, index + 1, violation));
            }
            scores.push(question.score);
        }

        if score_sum(scores).is_none() {
            violations.push(format!("模板 {}: {}", self.key, TOTAL_OVERFLOW_MESSAGE));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DraftError::InvalidInput(violations))
        }
    }

    /// 把模板合并到当前草稿上
    ///
    /// 标签与评分规则沿用当前草稿，题目按顺序取用 `next_id` 分配的新ID；
    /// 模板改变学科时清空科目专属规则
    pub fn merge_into(
        self,
        current: &PaperDraft,
        mut next_id: impl FnMut() -> QuestionId,
    ) -> PaperDraft {
        let questions = self
            .questions
            .into_iter()
            .map(|tq| tq.into_question(next_id()))
            .collect();

        let mut scoring_rules = current.scoring_rules.clone();
        if self.subject != current.subject {
            scoring_rules.reset_subject_rules();
        }

        let mut draft = PaperDraft {
            name: self.name,
            subject: self.subject,
            duration: self.duration,
            total_score: 0,
            difficulty: self.difficulty,
            tags: current.tags.clone(),
            description: self.description,
            questions,
            scoring_rules,
        };
        draft.recompute_total();
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_are_valid() {
        for key in PaperTemplate::BUILTIN_KEYS {
            assert!(PaperTemplate::builtin(key).validate().is_ok(), "{key}");
        }
    }

    #[test]
    fn test_merge_assigns_fresh_ids_and_keeps_tags() {
        let mut current = PaperDraft::default();
        current.tags = "期末".into();
        let mut counter = 10;
        let draft = PaperTemplate::builtin("math-basic").merge_into(&current, || {
            counter += 1;
            counter
        });
        let ids: Vec<_> = draft.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![11, 12, 13]);
        assert_eq!(draft.tags, "期末");
        assert_eq!(draft.total_score, 25);
        assert_eq!(draft.questions[0].correct_answers, BTreeSet::from([2]));
    }

    #[test]
    fn test_merge_resets_rules_when_subject_changes() {
        let mut current = PaperDraft::default();
        current.subject = Subject::Math;
        current.scoring_rules.math_rules = vec!["步骤分".into()];
        current.scoring_rules.review_threshold = 80;

        let mut counter = 0;
        let switched = PaperTemplate::builtin("english-basic").merge_into(&current, || {
            counter += 1;
            counter
        });
        assert_eq!(switched.subject, Subject::English);
        assert!(switched.scoring_rules.math_rules.is_empty());
        assert_eq!(switched.scoring_rules.review_threshold, 80);

        let same = PaperTemplate::builtin("math-basic").merge_into(&current, || {
            counter += 1;
            counter
        });
        assert_eq!(same.scoring_rules.math_rules, vec!["步骤分".to_string()]);
    }

    #[test]
    fn test_validate_rejects_total_overflow() {
        let mut template = PaperTemplate::builtin("math-basic");
        for content in ["证明一", "证明二"] {
            template.questions.push(TemplateQuestion::new(
                QuestionType::Essay,
                content,
                u32::MAX / 2,
                Difficulty::Hard,
            ));
        }
        let err = template.validate().unwrap_err();
        assert_eq!(err.messages(), vec!["模板 math-basic: 总分超出上限".to_string()]);
    }

    #[test]
    fn test_validate_rejects_disallowed_type() {
        let mut template = PaperTemplate::builtin("math-basic");
        template.questions.push(TemplateQuestion::new(
            QuestionType::Composition,
            "写一篇作文",
            25,
            Difficulty::Hard,
        ));
        let err = template.validate().unwrap_err();
        assert_eq!(err.messages().len(), 1);
    }

    #[test]
    fn test_unknown_key_falls_back_to_empty() {
        let template = PaperTemplate::builtin("physics");
        assert_eq!(template.key, "empty");
        assert!(template.questions.is_empty());
    }
}
