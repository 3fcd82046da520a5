//! 题目勾选集合（临时界面状态，不随草稿保存）

use crate::models::{PaperDraft, QuestionId};
use std::collections::BTreeSet;

/// 全选框的三态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    None,
    Partial,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<QuestionId>,
}

impl Selection {
    pub fn ids(&self) -> &BTreeSet<QuestionId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.ids.contains(&id)
    }

    /// 切换勾选，返回切换后是否选中
    pub fn toggle(&mut self, id: QuestionId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn remove(&mut self, id: QuestionId) {
        self.ids.remove(&id);
    }

    pub fn select_all(&mut self, draft: &PaperDraft) {
        self.ids = draft.questions.iter().map(|q| q.id).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn state(&self, total: usize) -> SelectionState {
        match self.ids.len() {
            0 => SelectionState::None,
            n if n == total => SelectionState::All,
            _ => SelectionState::Partial,
        }
    }
}
