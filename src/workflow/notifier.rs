//! 渲染通知
//!
//! 每次变更成功后把一致的快照交给界面层

use crate::models::{PaperDraft, QuestionId};
use std::collections::BTreeSet;

/// 界面层回调
pub trait RenderNotifier {
    fn on_change(&mut self, draft: &PaperDraft, selection: &BTreeSet<QuestionId>);
}

impl<F> RenderNotifier for F
where
    F: FnMut(&PaperDraft, &BTreeSet<QuestionId>),
{
    fn on_change(&mut self, draft: &PaperDraft, selection: &BTreeSet<QuestionId>) {
        self(draft, selection)
    }
}
