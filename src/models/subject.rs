use crate::models::question::QuestionType;
use phf::phf_map;

/// 科目别名表（表单值、中文名与简称）
static SUBJECT_ALIASES: phf::Map<&'static str, Subject> = phf_map! {
    "" => Subject::Unset,
    "math" => Subject::Math,
    "数学" => Subject::Math,
    "数" => Subject::Math,
    "english" => Subject::English,
    "英语" => Subject::English,
    "英" => Subject::English,
};

const MATH_TYPES: &[QuestionType] = &[
    QuestionType::Choice,
    QuestionType::Multiple,
    QuestionType::Fill,
    QuestionType::Short,
    QuestionType::Essay,
];

const ENGLISH_TYPES: &[QuestionType] = &[
    QuestionType::Choice,
    QuestionType::Multiple,
    QuestionType::Fill,
    QuestionType::Short,
    QuestionType::Composition,
];

/// 科目枚举
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    /// 数学
    Math,
    /// 英语
    English,
    /// 未选择
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl Subject {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Subject::Math => "数学",
            Subject::English => "英语",
            Subject::Unset => "未选择",
        }
    }

    /// 表单值
    pub fn key(self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::English => "english",
            Subject::Unset => "",
        }
    }

    /// 从表单值或中文名解析科目（忽略首尾空白与大小写）
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        SUBJECT_ALIASES.get(normalized.as_str()).copied()
    }

    pub fn is_set(self) -> bool {
        self != Subject::Unset
    }

    /// 该科目可添加的题型
    pub fn allowed_types(self) -> &'static [QuestionType] {
        match self {
            Subject::Math => MATH_TYPES,
            Subject::English => ENGLISH_TYPES,
            Subject::Unset => QuestionType::ALL,
        }
    }

    pub fn allows(self, kind: QuestionType) -> bool {
        self.allowed_types().contains(&kind)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
