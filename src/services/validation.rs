//! 保存/发布校验
//!
//! 一次返回全部问题，便于界面一次性展示

use crate::models::PaperDraft;

/// 校验规则集
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// 保存草稿
    Save,
    /// 发布试卷（额外检查选择题答案）
    Publish,
}

/// 按规则集校验草稿，返回按顺序排列的问题列表；通过时为空
pub fn validate(draft: &PaperDraft, mode: ValidationMode) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push("请填写试卷名称".to_string());
    }

    if !draft.subject.is_set() {
        errors.push("请选择学科".to_string());
    }

    if draft.questions.is_empty() {
        errors.push("请至少添加一道题目".to_string());
        return errors;
    }

    let incomplete = draft
        .questions
        .iter()
        .filter(|q| !q.is_content_complete())
        .count();
    if incomplete > 0 {
        errors.push(format!("有 {} 道题目内容不完整", incomplete));
    }

    if mode == ValidationMode::Publish {
        let unanswered = draft
            .questions
            .iter()
            .filter(|q| q.lacks_correct_answer())
            .count();
        if unanswered > 0 {
            errors.push(format!("有 {} 道选择题未设置正确答案", unanswered));
        }
    }

    errors
}
