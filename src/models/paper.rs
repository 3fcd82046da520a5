use crate::models::question::{Difficulty, Question, QuestionId};
use crate::models::subject::Subject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 默认考试时长（分钟）
pub const DEFAULT_DURATION: u32 = 120;
/// 默认人工复核阈值（百分比）
pub const DEFAULT_REVIEW_THRESHOLD: u8 = 70;

/// 总分超出范围时的提示
pub const TOTAL_OVERFLOW_MESSAGE: &str = "总分超出上限";

/// 累加分值，溢出时返回 None
pub fn score_sum(scores: impl IntoIterator<Item = u32>) -> Option<u32> {
    scores.into_iter().try_fold(0u32, u32::checked_add)
}

/// 评分严格程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Lenient,
    #[default]
    Normal,
    Strict,
}

impl Strictness {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lenient" | "宽松" => Some(Strictness::Lenient),
            "normal" | "标准" => Some(Strictness::Normal),
            "strict" | "严格" => Some(Strictness::Strict),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strictness::Lenient => "宽松",
            Strictness::Normal => "标准",
            Strictness::Strict => "严格",
        }
    }
}

/// 评分规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRules {
    #[serde(default)]
    pub strictness: Strictness,
    #[serde(default = "default_review_threshold")]
    pub review_threshold: u8,
    #[serde(default)]
    pub math_rules: Vec<String>,
    #[serde(default)]
    pub english_rules: Vec<String>,
}

fn default_review_threshold() -> u8 {
    DEFAULT_REVIEW_THRESHOLD
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            strictness: Strictness::Normal,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            math_rules: Vec::new(),
            english_rules: Vec::new(),
        }
    }
}

impl ScoringRules {
    /// 当前科目对应的规则列表
    pub fn rules_for(&self, subject: Subject) -> &[String] {
        match subject {
            Subject::Math => &self.math_rules,
            Subject::English => &self.english_rules,
            Subject::Unset => &[],
        }
    }

    /// 重置科目专属规则
    pub fn reset_subject_rules(&mut self) {
        self.math_rules.clear();
        self.english_rules.clear();
    }
}

/// 正在编辑的试卷草稿
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: Subject,
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// 派生字段，始终等于各题分值之和
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub scoring_rules: ScoringRules,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION
}

impl Default for PaperDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            subject: Subject::Unset,
            duration: DEFAULT_DURATION,
            total_score: 0,
            difficulty: Difficulty::Medium,
            tags: String::new(),
            description: String::new(),
            questions: Vec::new(),
            scoring_rules: ScoringRules::default(),
        }
    }
}

impl PaperDraft {
    /// 各题分值之和，溢出时返回 None
    pub fn checked_total(&self) -> Option<u32> {
        score_sum(self.questions.iter().map(|q| q.score))
    }

    /// 重新计算总分
    ///
    /// 变更接口在写入前已拒绝会溢出的分值，这里饱和到上限而不是回绕
    pub fn recompute_total(&mut self) {
        self.total_score = self.checked_total().unwrap_or(u32::MAX);
    }

    /// 检查从外部读入的草稿是否满足数据约束
    ///
    /// 题目ID唯一、每道题结构合法、总分不溢出；返回全部违反项
    pub fn integrity_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut seen = BTreeSet::new();

        for q in &self.questions {
            if !seen.insert(q.id) {
                violations.push(format!("题目ID #{} 重复", q.id));
            }
            for violation in q.shape_violations() {
                violations.push(format!("题目 #{}: {}", q.id, violation));
            }
        }

        if self.checked_total().is_none() {
            violations.push(TOTAL_OVERFLOW_MESSAGE.to_string());
        }
        violations
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn position_of(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.position_of(id).is_some()
    }

    /// 草稿中出现过的最大题目ID
    pub fn max_question_id(&self) -> QuestionId {
        self.questions.iter().map(|q| q.id).max().unwrap_or(0)
    }

    /// 是否有值得提醒用户的未保存内容
    pub fn has_content(&self) -> bool {
        !self.questions.is_empty() || !self.name.trim().is_empty()
    }
}
