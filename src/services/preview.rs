//! 派生视图：题目列表与试卷预览的纯文本渲染

use crate::models::question::option_label;
use crate::models::{PaperDraft, QuestionId};
use crate::utils::logging::truncate_text;
use std::collections::BTreeSet;
use std::fmt::Write;

const PLACEHOLDER_CONTENT: &str = "题目内容待完善...";

/// 渲染题目列表（编辑区）
pub fn render_question_list(draft: &PaperDraft, selection: &BTreeSet<QuestionId>) -> String {
    if draft.questions.is_empty() {
        return "还没有添加题目\n选择题目类型并添加题目开始创建\n".to_string();
    }

    let mut out = String::new();
    for (index, q) in draft.questions.iter().enumerate() {
        let mark = if selection.contains(&q.id) { "[x]" } else { "[ ]" };
        let content = if q.is_content_complete() {
            truncate_text(&q.content, 40)
        } else {
            PLACEHOLDER_CONTENT.to_string()
        };
        let _ = write!(
            out,
            "{} {}. #{} {} | {} | {}分 | {}",
            mark,
            index + 1,
            q.id,
            q.kind.name(),
            content,
            q.score,
            q.difficulty.name()
        );
        if !q.options.is_empty() {
            let _ = write!(out, " | {}个选项", q.options.len());
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "共 {} 道题目，已选 {} 道，总分 {} 分",
        draft.questions.len(),
        selection.len(),
        draft.total_score
    );
    out
}

/// 渲染试卷预览
pub fn render_preview(draft: &PaperDraft) -> String {
    let mut out = String::new();
    let title = if draft.name.trim().is_empty() {
        "试卷标题"
    } else {
        draft.name.as_str()
    };
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(
        out,
        "学科：{}  时长：{} 分钟  总分：{} 分",
        draft.subject.name(),
        draft.duration,
        draft.total_score
    );
    let rules = draft.scoring_rules.rules_for(draft.subject);
    if !rules.is_empty() {
        let _ = writeln!(out, "评分规则：{}", rules.join("、"));
    }
    out.push_str(&"─".repeat(30));
    out.push('\n');

    if draft.questions.is_empty() {
        out.push_str("填写基本信息和添加题目后，预览将在此显示\n");
        return out;
    }

    for (index, q) in draft.questions.iter().enumerate() {
        let content = if q.is_content_complete() {
            q.content.as_str()
        } else {
            "题目内容待完善"
        };
        let _ = writeln!(out, "{}. {} ({}分)", index + 1, content, q.score);
        for (opt_index, option) in q.options.iter().enumerate() {
            if !option.trim().is_empty() {
                let _ = writeln!(out, "   {}. {}", option_label(opt_index), option);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, QuestionType, Subject};

    fn sample_draft() -> PaperDraft {
        let mut draft = PaperDraft::default();
        draft.name = "单元测验".into();
        draft.subject = Subject::Math;
        let mut q = Question::new(1, QuestionType::Choice);
        q.content = "2+2=?".into();
        q.options = vec!["3".into(), "4".into(), "".into(), "6".into()];
        draft.questions.push(q);
        draft.questions.push(Question::new(2, QuestionType::Fill));
        draft.recompute_total();
        draft
    }

    #[test]
    fn test_preview_skips_blank_options() {
        let preview = render_preview(&sample_draft());
        assert!(preview.starts_with("单元测验\n"));
        assert!(preview.contains("学科：数学  时长：120 分钟  总分：10 分"));
        assert!(preview.contains("   B. 4\n"));
        assert!(!preview.contains("   C."));
        assert!(preview.contains("2. 题目内容待完善 (6分)"));
        assert!(!preview.contains("评分规则"));
    }

    #[test]
    fn test_preview_lists_rules_of_current_subject() {
        let mut draft = sample_draft();
        draft.scoring_rules.math_rules = vec!["步骤分".into(), "单位检查".into()];
        draft.scoring_rules.english_rules = vec!["拼写".into()];

        let preview = render_preview(&draft);
        assert!(preview.contains("评分规则：步骤分、单位检查\n"));
        assert!(!preview.contains("拼写"));
    }

    #[test]
    fn test_question_list_marks_selection() {
        let selection = BTreeSet::from([2]);
        let list = render_question_list(&sample_draft(), &selection);
        let lines: Vec<_> = list.lines().collect();
        assert!(lines[0].starts_with("[ ] 1. #1 单选题 | 2+2=?"));
        assert!(lines[1].starts_with("[x] 2. #2 填空题 | 题目内容待完善..."));
        assert_eq!(lines[2], "共 2 道题目，已选 1 道，总分 10 分");
    }

    #[test]
    fn test_empty_preview_placeholder() {
        let preview = render_preview(&PaperDraft::default());
        assert!(preview.starts_with("试卷标题\n"));
        assert!(preview.contains("学科：未选择"));
        assert!(preview.ends_with("预览将在此显示\n"));
    }
}
