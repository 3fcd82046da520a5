//! 草稿存储区 - 业务能力层
//!
//! 持有唯一的草稿与题目ID计数器

use crate::models::{PaperDraft, QuestionId};

/// 草稿存储区
///
/// 职责：
/// - 持有当前草稿
/// - 分配单调递增的题目ID
/// - 整体替换草稿时保证ID不回退
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    draft: PaperDraft,
    counter: QuestionId,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只读快照
    pub fn get(&self) -> &PaperDraft {
        &self.draft
    }

    /// 仅供变更接口使用的可写引用
    pub(crate) fn draft_mut(&mut self) -> &mut PaperDraft {
        &mut self.draft
    }

    /// 整体替换草稿（模板装载、草稿恢复）
    ///
    /// 计数器取 `max(counter_floor, 草稿最大ID, 0)`，总分重新计算
    pub fn replace(&mut self, mut new_draft: PaperDraft, counter_floor: QuestionId) {
        new_draft.recompute_total();
        self.counter = counter_floor.max(new_draft.max_question_id());
        self.draft = new_draft;
    }

    /// 分配下一个题目ID
    pub fn next_id(&mut self) -> QuestionId {
        self.counter += 1;
        self.counter
    }

    /// 最近一次分配的ID（从未分配时为 0）
    pub fn last_issued_id(&self) -> QuestionId {
        self.counter
    }
}
