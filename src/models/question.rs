use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 题目ID（会话内单调递增，永不复用）
pub type QuestionId = u64;

/// 题型别名表
static TYPE_ALIASES: phf::Map<&'static str, QuestionType> = phf_map! {
    "choice" => QuestionType::Choice,
    "单选题" => QuestionType::Choice,
    "multiple" => QuestionType::Multiple,
    "多选题" => QuestionType::Multiple,
    "fill" => QuestionType::Fill,
    "填空题" => QuestionType::Fill,
    "short" => QuestionType::Short,
    "简答题" => QuestionType::Short,
    "essay" => QuestionType::Essay,
    "解答题" => QuestionType::Essay,
    "composition" => QuestionType::Composition,
    "作文题" => QuestionType::Composition,
};

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// 单选题
    Choice,
    /// 多选题
    Multiple,
    /// 填空题
    Fill,
    /// 简答题
    Short,
    /// 解答题
    Essay,
    /// 作文题
    Composition,
}

impl QuestionType {
    pub const ALL: &'static [QuestionType] = &[
        QuestionType::Choice,
        QuestionType::Multiple,
        QuestionType::Fill,
        QuestionType::Short,
        QuestionType::Essay,
        QuestionType::Composition,
    ];

    /// 中文名称
    pub fn name(self) -> &'static str {
        match self {
            QuestionType::Choice => "单选题",
            QuestionType::Multiple => "多选题",
            QuestionType::Fill => "填空题",
            QuestionType::Short => "简答题",
            QuestionType::Essay => "解答题",
            QuestionType::Composition => "作文题",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            QuestionType::Choice => "choice",
            QuestionType::Multiple => "multiple",
            QuestionType::Fill => "fill",
            QuestionType::Short => "short",
            QuestionType::Essay => "essay",
            QuestionType::Composition => "composition",
        }
    }

    /// 新建题目时的默认分值
    pub fn default_score(self) -> u32 {
        match self {
            QuestionType::Choice => 4,
            QuestionType::Multiple => 5,
            QuestionType::Fill => 6,
            QuestionType::Short => 10,
            QuestionType::Essay => 15,
            QuestionType::Composition => 25,
        }
    }

    /// 是否带选项（单选/多选）
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::Choice | QuestionType::Multiple)
    }

    pub fn parse(s: &str) -> Option<Self> {
        TYPE_ALIASES.get(s.trim().to_lowercase().as_str()).copied()
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "简单" => Some(Difficulty::Easy),
            "medium" | "中等" => Some(Difficulty::Medium),
            "hard" | "困难" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 试卷中的一道题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub score: u32,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answers: BTreeSet<usize>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Question {
    /// 按题型创建空白题目
    pub fn new(id: QuestionId, kind: QuestionType) -> Self {
        Self {
            id,
            kind,
            title: String::new(),
            content: String::new(),
            score: kind.default_score(),
            options: if kind.has_options() {
                vec![String::new(); 4]
            } else {
                Vec::new()
            },
            correct_answers: BTreeSet::new(),
            explanation: String::new(),
            difficulty: Difficulty::Medium,
        }
    }

    pub fn is_content_complete(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// 选择题是否缺少正确答案
    pub fn lacks_correct_answer(&self) -> bool {
        self.kind.has_options() && self.correct_answers.is_empty()
    }

    /// 检查结构约束，返回全部违反项
    ///
    /// 不检查内容是否为空（草稿阶段允许）
    pub fn shape_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.score == 0 {
            violations.push("分值必须大于0".to_string());
        }

        if !self.kind.has_options() && !self.options.is_empty() {
            violations.push(format!("{}不能设置选项", self.kind.name()));
        }

        if let Some(&bad) = self
            .correct_answers
            .iter()
            .find(|&&index| index >= self.options.len())
        {
            violations.push(format!(
                "正确答案 {} 超出选项范围 (共 {} 个选项)",
                option_label(bad),
                self.options.len()
            ));
        }

        if self.kind == QuestionType::Choice && self.correct_answers.len() > 1 {
            violations.push("单选题只能有一个正确答案".to_string());
        }

        violations
    }
}

/// 选项序号对应的字母标签（0 → A）
pub fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => format!("#{}", index + 1),
    }
}

/// 编辑题目时提交的部分字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPatch {
    pub content: Option<String>,
    pub score: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub explanation: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answers: Option<BTreeSet<usize>>,
}

impl QuestionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 把补丁应用到题目副本上
    ///
    /// 内容与选项去除首尾空白
    pub fn apply_to(&self, question: &mut Question) {
        if let Some(content) = &self.content {
            question.content = content.trim().to_string();
        }
        if let Some(score) = self.score {
            question.score = score;
        }
        if let Some(difficulty) = self.difficulty {
            question.difficulty = difficulty;
        }
        if let Some(explanation) = &self.explanation {
            question.explanation = explanation.clone();
        }
        if let Some(options) = &self.options {
            question.options = options.iter().map(|o| o.trim().to_string()).collect();
        }
        if let Some(answers) = &self.correct_answers {
            question.correct_answers = answers.clone();
        }
    }
}
