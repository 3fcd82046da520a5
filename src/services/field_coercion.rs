//! 表单字段转换
//!
//! 表单传来的都是字符串，在边界处转换为字段声明的类型；无法转换时拒绝

use crate::error::{DraftError, DraftResult};
use crate::models::{Difficulty, Strictness, Subject};
use regex::Regex;

/// 试卷基本信息字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Subject,
    Duration,
    Difficulty,
    Tags,
    Description,
}

impl DraftField {
    /// 解析字段名（兼容表单控件ID，如 `paperName`）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "name" | "paperName" => Some(DraftField::Name),
            "subject" => Some(DraftField::Subject),
            "duration" => Some(DraftField::Duration),
            "difficulty" => Some(DraftField::Difficulty),
            "tags" => Some(DraftField::Tags),
            "description" => Some(DraftField::Description),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "试卷名称",
            DraftField::Subject => "学科",
            DraftField::Duration => "考试时长",
            DraftField::Difficulty => "难度",
            DraftField::Tags => "标签",
            DraftField::Description => "描述",
        }
    }
}

/// 转换后的字段值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Subject(Subject),
    Minutes(u32),
    Difficulty(Difficulty),
}

/// 把原始输入转换为字段值
pub fn coerce_field(field: DraftField, raw: &str) -> DraftResult<FieldValue> {
    match field {
        DraftField::Name | DraftField::Tags | DraftField::Description => {
            Ok(FieldValue::Text(raw.to_string()))
        }
        DraftField::Subject => Subject::parse(raw)
            .map(FieldValue::Subject)
            .ok_or_else(|| DraftError::invalid(format!("未知学科: {}", raw.trim()))),
        DraftField::Difficulty => Difficulty::parse(raw)
            .map(FieldValue::Difficulty)
            .ok_or_else(|| DraftError::invalid(format!("未知难度: {}", raw.trim()))),
        DraftField::Duration => parse_minutes(raw).map(FieldValue::Minutes),
    }
}

/// 解析考试时长，接受 `90`、`90分钟`、`90 min` 等写法
pub fn parse_minutes(raw: &str) -> DraftResult<u32> {
    let re = Regex::new(r"^\s*(\d+)\s*(?:分钟|分|min|mins|minutes)?\s*$")
        .map_err(|e| DraftError::invalid(format!("时长格式错误: {}", e)))?;

    let minutes = re
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| DraftError::invalid(format!("考试时长必须是正整数分钟: {}", raw.trim())))?;

    if minutes == 0 {
        return Err(DraftError::invalid("考试时长必须大于0"));
    }
    Ok(minutes)
}

/// 评分规则设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringRule {
    Strictness(Strictness),
    /// 人工复核阈值（百分比）
    ReviewThreshold(u32),
    /// 当前学科的专项规则列表
    SubjectRules(Vec<String>),
}

impl ScoringRule {
    /// 从表单输入解析评分规则
    pub fn parse(kind: &str, raw: &str) -> DraftResult<Self> {
        match kind.trim() {
            "strictness" => Strictness::parse(raw)
                .map(ScoringRule::Strictness)
                .ok_or_else(|| DraftError::invalid(format!("未知评分严格程度: {}", raw.trim()))),
            "threshold" | "reviewThreshold" => raw
                .trim()
                .trim_end_matches('%')
                .parse::<u32>()
                .map(ScoringRule::ReviewThreshold)
                .map_err(|_| DraftError::invalid(format!("复核阈值必须是 0-100 的整数: {}", raw.trim()))),
            "rules" => Ok(ScoringRule::SubjectRules(
                raw.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            other => Err(DraftError::invalid(format!("未知评分规则: {}", other))),
        }
    }
}
