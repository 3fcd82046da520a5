//! 试卷编辑会话 - 流程层
//!
//! 核心职责：定义草稿的全部变更操作
//!
//! 每个操作要么完整生效并返回新快照，要么返回错误且草稿不变。
//! 生效后的顺序固定：重算总分 → 安排自动保存 → 通知界面层

use std::collections::BTreeSet;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{DraftError, DraftResult};
use crate::infrastructure::DraftStorage;
use crate::models::paper::{score_sum, TOTAL_OVERFLOW_MESSAGE};
use crate::models::{
    PaperDraft, PaperTemplate, Question, QuestionId, QuestionPatch, QuestionType, Subject,
};
use crate::services::autosave::{
    AutosaveGateway, AutosaveSettings, RecoveryPrompt, SaveReport, SaveTrigger, StoredDraft,
};
use crate::services::draft_store::DraftStore;
use crate::services::field_coercion::{coerce_field, DraftField, FieldValue, ScoringRule};
use crate::services::preview::render_preview;
use crate::services::validation::{validate, ValidationMode};
use crate::workflow::notifier::RenderNotifier;
use crate::workflow::selection::{Selection, SelectionState};

/// 复制题目时追加在内容后的标记
pub const COPY_SUFFIX: &str = " - 副本";

/// 选择题至少保留的选项数
const MIN_OPTIONS: usize = 2;

/// 启动时草稿恢复的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// 没有保存过的草稿
    NoDraft,
    /// 已恢复
    Restored { questions: usize },
    /// 用户拒绝恢复（存储中的草稿保持不变）
    Declined,
    /// 保存的草稿无法读取
    Unreadable { warning: String },
}

/// 发布结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub paper: PaperDraft,
    /// 清除本地草稿失败时的警告
    pub storage_warning: Option<String>,
}

/// 试卷编辑会话
///
/// - 持有草稿存储区、勾选集合与自动保存网关
/// - 所有变更只能通过这里进行
/// - 单线程使用，不需要加锁
pub struct DraftEditor<S> {
    store: DraftStore,
    selection: Selection,
    autosave: AutosaveGateway<S>,
    notifier: Option<Box<dyn RenderNotifier>>,
}

impl<S: DraftStorage> DraftEditor<S> {
    /// 创建空白草稿的编辑会话
    pub fn new(storage: S, settings: AutosaveSettings) -> Self {
        Self {
            store: DraftStore::new(),
            selection: Selection::default(),
            autosave: AutosaveGateway::new(storage, settings),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: impl RenderNotifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    // ========== 只读访问 ==========

    pub fn draft(&self) -> &PaperDraft {
        self.store.get()
    }

    pub fn selection(&self) -> &BTreeSet<QuestionId> {
        self.selection.ids()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state(self.draft().questions.len())
    }

    /// 最近一次分配的题目ID
    pub fn last_issued_id(&self) -> QuestionId {
        self.store.last_issued_id()
    }

    pub fn autosave(&self) -> &AutosaveGateway<S> {
        &self.autosave
    }

    /// 当前学科允许添加的题型
    pub fn allowed_question_types(&self) -> &'static [QuestionType] {
        self.draft().subject.allowed_types()
    }

    /// 是否有未保存的内容（离开页面前提醒）
    pub fn has_unsaved_content(&self) -> bool {
        self.draft().has_content()
    }

    pub fn validate_save(&self) -> Vec<String> {
        validate(self.draft(), ValidationMode::Save)
    }

    pub fn validate_publish(&self) -> Vec<String> {
        validate(self.draft(), ValidationMode::Publish)
    }

    /// 渲染预览；要求先填写试卷名称
    pub fn preview(&self) -> DraftResult<String> {
        if self.draft().name.trim().is_empty() {
            return Err(DraftError::invalid("请先填写试卷名称"));
        }
        Ok(render_preview(self.draft()))
    }

    // ========== 基本信息与评分规则 ==========

    /// 设置试卷基本信息字段
    ///
    /// 切换学科时重置科目专属评分规则，并收窄之后可添加的题型
    pub fn set_field(&mut self, field: DraftField, raw: &str) -> DraftResult<&PaperDraft> {
        let value = coerce_field(field, raw)?;
        let draft = self.store.draft_mut();

        match (field, value) {
            (DraftField::Name, FieldValue::Text(text)) => draft.name = text,
            (DraftField::Tags, FieldValue::Text(text)) => draft.tags = text,
            (DraftField::Description, FieldValue::Text(text)) => draft.description = text,
            (DraftField::Duration, FieldValue::Minutes(minutes)) => draft.duration = minutes,
            (DraftField::Difficulty, FieldValue::Difficulty(difficulty)) => {
                draft.difficulty = difficulty
            }
            (DraftField::Subject, FieldValue::Subject(subject)) => {
                if draft.subject != subject {
                    info!("切换学科: {} → {}", draft.subject, subject);
                    draft.subject = subject;
                    draft.scoring_rules.reset_subject_rules();
                }
            }
            (field, value) => {
                return Err(DraftError::invalid(format!(
                    "{} 的值类型不匹配: {:?}",
                    field.label(),
                    value
                )))
            }
        }

        Ok(self.commit(true))
    }

    /// 设置评分规则
    pub fn set_scoring_rule(&mut self, rule: ScoringRule) -> DraftResult<&PaperDraft> {
        let draft = self.store.draft_mut();

        match rule {
            ScoringRule::Strictness(strictness) => draft.scoring_rules.strictness = strictness,
            ScoringRule::ReviewThreshold(threshold) => {
                let threshold = u8::try_from(threshold)
                    .ok()
                    .filter(|t| *t <= 100)
                    .ok_or_else(|| DraftError::invalid("复核阈值必须在 0-100 之间"))?;
                draft.scoring_rules.review_threshold = threshold;
            }
            ScoringRule::SubjectRules(rules) => match draft.subject {
                Subject::Math => draft.scoring_rules.math_rules = rules,
                Subject::English => draft.scoring_rules.english_rules = rules,
                Subject::Unset => return Err(DraftError::invalid("请先选择学科")),
            },
        }

        Ok(self.commit(true))
    }

    // ========== 题目增删改 ==========

    /// 按题型添加空白题目
    pub fn add_question(&mut self, kind: &str) -> DraftResult<&PaperDraft> {
        if kind.trim().is_empty() {
            return Err(DraftError::invalid("请先选择题目类型"));
        }
        let kind = QuestionType::parse(kind)
            .ok_or_else(|| DraftError::invalid(format!("未知题型: {}", kind.trim())))?;

        let subject = self.draft().subject;
        if !subject.allows(kind) {
            return Err(DraftError::invalid(format!(
                "{}试卷不支持{}",
                subject.name(),
                kind.name()
            )));
        }

        self.ensure_room_for(kind.default_score())?;
        let id = self.store.next_id();
        self.store.draft_mut().questions.push(Question::new(id, kind));
        info!("➕ 添加题目 #{} ({})", id, kind.name());

        Ok(self.commit(true))
    }

    /// 编辑题目
    ///
    /// 补丁先应用到副本上校验，全部通过才写回
    pub fn edit_question(
        &mut self,
        id: QuestionId,
        patch: &QuestionPatch,
    ) -> DraftResult<&PaperDraft> {
        let position = self.position(id)?;
        let mut edited = self.draft().questions[position].clone();
        patch.apply_to(&mut edited);

        let mut violations = Vec::new();
        if !edited.is_content_complete() {
            violations.push("请填写题目内容".to_string());
        }
        violations.extend(edited.shape_violations());
        if edited.lacks_correct_answer() {
            violations.push("请至少选择一个正确答案".to_string());
        }
        let scores = self.draft().questions.iter().enumerate().map(|(i, q)| {
            if i == position {
                edited.score
            } else {
                q.score
            }
        });
        if score_sum(scores).is_none() {
            violations.push(TOTAL_OVERFLOW_MESSAGE.to_string());
        }
        if !violations.is_empty() {
            debug!("题目 #{} 编辑被拒绝: {:?}", id, violations);
            return Err(DraftError::InvalidInput(violations));
        }

        self.store.draft_mut().questions[position] = edited;
        debug!("✏️ 题目 #{} 已保存", id);

        Ok(self.commit(true))
    }

    /// 复制题目到列表末尾
    pub fn duplicate_question(&mut self, id: QuestionId) -> DraftResult<&PaperDraft> {
        let position = self.position(id)?;
        let mut copy = self.draft().questions[position].clone();
        self.ensure_room_for(copy.score)?;
        copy.id = self.store.next_id();
        copy.content.push_str(COPY_SUFFIX);
        info!("📄 复制题目 #{} → #{}", id, copy.id);
        self.store.draft_mut().questions.push(copy);

        Ok(self.commit(true))
    }

    /// 删除题目，同时移出勾选集合
    pub fn delete_question(&mut self, id: QuestionId) -> DraftResult<&PaperDraft> {
        let position = self.position(id)?;
        self.store.draft_mut().questions.remove(position);
        self.selection.remove(id);
        info!("🗑️ 删除题目 #{}", id);

        Ok(self.commit(true))
    }

    /// 调整题目顺序
    pub fn reorder_question(&mut self, from: usize, to: usize) -> DraftResult<&PaperDraft> {
        let len = self.draft().questions.len();
        for index in [from, to] {
            if index >= len {
                return Err(DraftError::OutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(self.draft());
        }

        let questions = &mut self.store.draft_mut().questions;
        let moved = questions.remove(from);
        questions.insert(to, moved);
        debug!("题目顺序已调整: {} → {}", from, to);

        Ok(self.commit(true))
    }

    // ========== 选项编辑 ==========

    /// 为选择题追加空白选项
    pub fn add_option(&mut self, id: QuestionId) -> DraftResult<&PaperDraft> {
        let position = self.choice_position(id)?;
        self.store.draft_mut().questions[position]
            .options
            .push(String::new());

        Ok(self.commit(true))
    }

    /// 修改选项文字
    pub fn update_option(
        &mut self,
        id: QuestionId,
        index: usize,
        text: &str,
    ) -> DraftResult<&PaperDraft> {
        let position = self.choice_position(id)?;
        let question = &mut self.store.draft_mut().questions[position];
        let len = question.options.len();
        let option = question
            .options
            .get_mut(index)
            .ok_or(DraftError::OutOfRange { index, len })?;
        *option = text.trim().to_string();

        Ok(self.commit(true))
    }

    /// 删除选项；正确答案中的序号随之调整
    pub fn remove_option(&mut self, id: QuestionId, index: usize) -> DraftResult<&PaperDraft> {
        let position = self.choice_position(id)?;
        let question = &mut self.store.draft_mut().questions[position];
        let len = question.options.len();
        if index >= len {
            return Err(DraftError::OutOfRange { index, len });
        }
        if len <= MIN_OPTIONS {
            return Err(DraftError::invalid(format!(
                "选择题至少需要 {} 个选项",
                MIN_OPTIONS
            )));
        }

        question.options.remove(index);
        question.correct_answers = question
            .correct_answers
            .iter()
            .filter(|&&answer| answer != index)
            .map(|&answer| if answer > index { answer - 1 } else { answer })
            .collect();

        Ok(self.commit(true))
    }

    // ========== 勾选与批量操作 ==========

    /// 切换题目勾选
    pub fn toggle_select(&mut self, id: QuestionId) -> DraftResult<&PaperDraft> {
        self.position(id)?;
        self.selection.toggle(id);
        Ok(self.commit(false))
    }

    /// 全选或取消全选
    pub fn select_all(&mut self, selected: bool) -> &PaperDraft {
        if selected {
            self.selection.select_all(self.store.get());
        } else {
            self.selection.clear();
        }
        self.commit(false)
    }

    /// 为所有勾选的题目设置同一分值
    pub fn batch_set_score(&mut self, score: u32) -> DraftResult<&PaperDraft> {
        let mut violations = Vec::new();
        if score == 0 {
            violations.push("请输入有效的分值".to_string());
        }
        if self.selection.is_empty() {
            violations.push("请先选择要设置分值的题目".to_string());
        }
        if !violations.is_empty() {
            return Err(DraftError::InvalidInput(violations));
        }

        let selection = &self.selection;
        let scores = self.store.get().questions.iter().map(|q| {
            if selection.contains(q.id) {
                score
            } else {
                q.score
            }
        });
        if score_sum(scores).is_none() {
            return Err(DraftError::invalid(TOTAL_OVERFLOW_MESSAGE));
        }

        let mut updated = 0;
        for question in self.store.draft_mut().questions.iter_mut() {
            if selection.contains(question.id) {
                question.score = score;
                updated += 1;
            }
        }
        info!("已为 {} 道题目设置分值为 {} 分", updated, score);

        Ok(self.commit(true))
    }

    /// 删除所有勾选的题目
    pub fn batch_delete(&mut self) -> DraftResult<&PaperDraft> {
        if self.selection.is_empty() {
            return Err(DraftError::invalid("请先选择要删除的题目"));
        }

        let selection = &self.selection;
        let questions = &mut self.store.draft_mut().questions;
        let before = questions.len();
        questions.retain(|q| !selection.contains(q.id));
        info!("🗑️ 批量删除 {} 道题目", before - questions.len());
        self.selection.clear();

        Ok(self.commit(true))
    }

    // ========== 模板与恢复 ==========

    /// 装载模板，题目使用新分配的ID
    pub fn load_template(&mut self, template: PaperTemplate) -> DraftResult<&PaperDraft> {
        template.validate()?;
        let key = template.key.clone();

        let current = self.store.get().clone();
        let store = &mut self.store;
        let merged = template.merge_into(&current, || store.next_id());
        let floor = self.store.last_issued_id();
        self.store.replace(merged, floor);
        self.selection.clear();
        info!("📋 模板已加载: {}", key);

        Ok(self.commit(true))
    }

    /// 检测并询问是否恢复已保存的草稿
    ///
    /// 拒绝时存储中的草稿保持不变
    pub fn offer_recovery(&mut self, prompt: &mut impl RecoveryPrompt) -> RecoveryOutcome {
        match self.autosave.load() {
            StoredDraft::Missing => RecoveryOutcome::NoDraft,
            StoredDraft::Unreadable(warning) => RecoveryOutcome::Unreadable { warning },
            StoredDraft::Found(draft) => {
                if !prompt.confirm_restore(&draft) {
                    info!("用户放弃恢复草稿");
                    return RecoveryOutcome::Declined;
                }

                let questions = draft.questions.len();
                let floor = self.store.last_issued_id();
                self.store.replace(draft, floor);
                self.selection.clear();
                info!("✓ 草稿已恢复 ({} 道题目)", questions);
                self.commit(false);
                RecoveryOutcome::Restored { questions }
            }
        }
    }

    // ========== 保存与发布 ==========

    /// 防抖保存到期时写入存储
    pub fn flush_due(&mut self, now: Instant) -> Option<SaveReport> {
        self.autosave.flush_if_due(self.store.get(), now)
    }

    /// 周期保存；本次会话尚未修改过内容时跳过
    pub fn save_periodic(&mut self) -> Option<SaveReport> {
        if !self.autosave.has_changes() {
            debug!("草稿未变更，跳过周期保存");
            return None;
        }
        Some(self.autosave.save(self.store.get(), SaveTrigger::Periodic))
    }

    /// 保存草稿：先按保存规则校验，再立即写入存储
    pub fn save_draft(&mut self) -> DraftResult<SaveReport> {
        let errors = self.validate_save();
        if !errors.is_empty() {
            return Err(DraftError::ValidationFailed(errors));
        }

        self.autosave.cancel_pending();
        let report = self.autosave.save(self.store.get(), SaveTrigger::Manual);
        info!("{}", report);
        Ok(report)
    }

    /// 发布试卷
    ///
    /// 校验通过后清除本地草稿，会话回到空白草稿（ID计数器保留）
    pub fn publish(&mut self) -> DraftResult<PublishReceipt> {
        let errors = self.validate_publish();
        if !errors.is_empty() {
            return Err(DraftError::ValidationFailed(errors));
        }

        let paper = self.store.get().clone();
        let storage_warning = match self.autosave.clear() {
            Ok(()) => None,
            Err(e) => {
                warn!("⚠️ 清除本地草稿失败: {}", e);
                Some(e.to_string())
            }
        };

        let floor = self.store.last_issued_id();
        self.store.replace(PaperDraft::default(), floor);
        self.selection.clear();
        info!(
            "✅ 试卷发布成功: {} ({} 道题目, 总分 {})",
            paper.name,
            paper.questions.len(),
            paper.total_score
        );
        self.commit(false);

        Ok(PublishReceipt {
            paper,
            storage_warning,
        })
    }

    // ========== 内部辅助 ==========

    fn position(&self, id: QuestionId) -> DraftResult<usize> {
        self.draft()
            .position_of(id)
            .ok_or(DraftError::NotFound { id })
    }

    /// 追加分值后总分不能溢出
    fn ensure_room_for(&self, score: u32) -> DraftResult<()> {
        self.draft()
            .total_score
            .checked_add(score)
            .map(drop)
            .ok_or_else(|| DraftError::invalid(TOTAL_OVERFLOW_MESSAGE))
    }

    fn choice_position(&self, id: QuestionId) -> DraftResult<usize> {
        let position = self.position(id)?;
        let kind = self.draft().questions[position].kind;
        if !kind.has_options() {
            return Err(DraftError::invalid(format!("{}没有选项", kind.name())));
        }
        Ok(position)
    }

    /// 变更生效后的统一收尾
    fn commit(&mut self, content_changed: bool) -> &PaperDraft {
        self.store.draft_mut().recompute_total();
        if content_changed {
            self.autosave.schedule();
        }
        if let Some(notifier) = self.notifier.as_mut() {
            notifier.on_change(self.store.get(), self.selection.ids());
        }
        self.store.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStorage;
    use crate::services::autosave::DRAFT_STORAGE_KEY;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> DraftEditor<MemoryStorage> {
        DraftEditor::new(MemoryStorage::new(), AutosaveSettings::default())
    }

    fn choice_patch(content: &str, answer: usize) -> QuestionPatch {
        QuestionPatch {
            content: Some(content.to_string()),
            options: Some(vec!["3".into(), "4".into(), "5".into(), "6".into()]),
            correct_answers: Some(BTreeSet::from([answer])),
            ..Default::default()
        }
    }

    fn assert_total_consistent(draft: &PaperDraft) {
        let sum: u32 = draft.questions.iter().map(|q| q.score).sum();
        assert_eq!(draft.total_score, sum);
    }

    #[tokio::test]
    async fn test_add_question_defaults() {
        let mut editor = editor();
        let draft = editor.add_question("multiple").unwrap();
        let q = &draft.questions[0];
        assert_eq!(q.id, 1);
        assert_eq!(q.score, 5);
        assert_eq!(q.options.len(), 4);
        assert_eq!(draft.total_score, 5);
        assert!(editor.autosave().is_pending());
    }

    #[tokio::test]
    async fn test_add_question_rejects_empty_unknown_and_disallowed() {
        let mut editor = editor();
        assert!(matches!(editor.add_question(" "), Err(DraftError::InvalidInput(_))));
        assert!(matches!(editor.add_question("poem"), Err(DraftError::InvalidInput(_))));

        editor.set_field(DraftField::Subject, "math").unwrap();
        assert!(!editor
            .allowed_question_types()
            .contains(&QuestionType::Composition));
        let err = editor.add_question("composition").unwrap_err();
        assert_eq!(err.messages(), vec!["数学试卷不支持作文题".to_string()]);
        assert!(editor.draft().questions.is_empty());
        assert_eq!(editor.last_issued_id(), 0);
    }

    #[tokio::test]
    async fn test_edit_question_is_atomic() {
        let mut editor = editor();
        editor.add_question("choice").unwrap();
        let before = editor.draft().clone();

        let patch = QuestionPatch {
            content: Some("  ".into()),
            score: Some(0),
            ..Default::default()
        };
        let err = editor.edit_question(1, &patch).unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["请填写题目内容", "分值必须大于0", "请至少选择一个正确答案"]
        );
        assert_eq!(editor.draft(), &before);
    }

    #[tokio::test]
    async fn test_edit_question_rejects_answer_outside_options() {
        let mut editor = editor();
        editor.add_question("choice").unwrap();
        let mut patch = choice_patch("2+2=?", 1);
        patch.correct_answers = Some(BTreeSet::from([4]));
        assert!(editor.edit_question(1, &patch).is_err());

        let patch = QuestionPatch {
            content: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(
            editor.edit_question(99, &patch).unwrap_err(),
            DraftError::NotFound { id: 99 }
        );
    }

    #[tokio::test]
    async fn test_set_field_coerces_and_resets_subject_rules() {
        let mut editor = editor();
        editor.set_field(DraftField::Subject, "math").unwrap();
        editor
            .set_scoring_rule(ScoringRule::SubjectRules(vec!["步骤分".into()]))
            .unwrap();
        assert_eq!(editor.draft().scoring_rules.math_rules.len(), 1);

        // 同一学科不重置
        editor.set_field(DraftField::Subject, "数学").unwrap();
        assert_eq!(editor.draft().scoring_rules.math_rules.len(), 1);

        editor.set_field(DraftField::Subject, "english").unwrap();
        assert!(editor.draft().scoring_rules.math_rules.is_empty());

        editor.set_field(DraftField::Duration, "90分钟").unwrap();
        assert_eq!(editor.draft().duration, 90);
        assert!(editor.set_field(DraftField::Duration, "ninety").is_err());
        assert_eq!(editor.draft().duration, 90);
    }

    #[tokio::test]
    async fn test_scoring_rule_threshold_bounds() {
        let mut editor = editor();
        editor
            .set_scoring_rule(ScoringRule::ReviewThreshold(100))
            .unwrap();
        assert!(editor
            .set_scoring_rule(ScoringRule::ReviewThreshold(101))
            .is_err());
        assert_eq!(editor.draft().scoring_rules.review_threshold, 100);
        assert!(editor
            .set_scoring_rule(ScoringRule::SubjectRules(vec![]))
            .is_err());
    }

    #[tokio::test]
    async fn test_duplicate_appends_copy_with_fresh_id() {
        let mut editor = editor();
        editor.add_question("choice").unwrap();
        editor.edit_question(1, &choice_patch("2+2=?", 1)).unwrap();
        let draft = editor.duplicate_question(1).unwrap();

        let copy = &draft.questions[1];
        assert_eq!(copy.id, 2);
        assert_eq!(copy.content, "2+2=? - 副本");
        assert_eq!(copy.options, draft.questions[0].options);
        assert_eq!(copy.correct_answers, BTreeSet::from([1]));
        assert_eq!(draft.total_score, 8);
    }

    #[tokio::test]
    async fn test_reorder_is_permutation() {
        let mut editor = editor();
        for kind in ["choice", "fill", "essay"] {
            editor.add_question(kind).unwrap();
        }
        let ids = |d: &PaperDraft| d.questions.iter().map(|q| q.id).collect::<Vec<_>>();

        assert_eq!(ids(editor.reorder_question(0, 2).unwrap()), vec![2, 3, 1]);
        assert_eq!(ids(editor.reorder_question(1, 1).unwrap()), vec![2, 3, 1]);
        assert_eq!(
            editor.reorder_question(3, 0).unwrap_err(),
            DraftError::OutOfRange { index: 3, len: 3 }
        );
        assert_eq!(ids(editor.draft()), vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_delete_purges_selection() {
        let mut editor = editor();
        editor.add_question("fill").unwrap();
        editor.add_question("short").unwrap();
        editor.toggle_select(1).unwrap();
        editor.delete_question(1).unwrap();

        assert!(editor.selection().is_empty());
        assert_eq!(
            editor.toggle_select(1).unwrap_err(),
            DraftError::NotFound { id: 1 }
        );
    }

    #[tokio::test]
    async fn test_batch_operations() {
        let mut editor = editor();
        for kind in ["fill", "short", "essay"] {
            editor.add_question(kind).unwrap();
        }

        let err = editor.batch_set_score(0).unwrap_err();
        assert_eq!(err.messages().len(), 2);
        assert!(editor.batch_delete().is_err());

        editor.toggle_select(1).unwrap();
        editor.toggle_select(3).unwrap();
        assert_eq!(editor.selection_state(), SelectionState::Partial);

        let draft = editor.batch_set_score(10).unwrap();
        assert_eq!(draft.questions[0].score, 10);
        assert_eq!(draft.questions[1].score, 10);
        assert_eq!(draft.questions[2].score, 10);
        assert_eq!(draft.total_score, 30);

        let draft = editor.batch_delete().unwrap();
        assert_eq!(draft.questions.len(), 1);
        assert_eq!(draft.questions[0].id, 2);
        assert_total_consistent(draft);
        assert!(editor.selection().is_empty());
    }

    #[tokio::test]
    async fn test_scores_that_overflow_total_are_rejected() {
        let mut editor = editor();
        editor.add_question("fill").unwrap();
        editor.add_question("fill").unwrap();
        editor.select_all(true);

        let err = editor.batch_set_score(u32::MAX).unwrap_err();
        assert_eq!(err.messages(), vec!["总分超出上限".to_string()]);
        assert_eq!(editor.draft().total_score, 12);

        let patch = QuestionPatch {
            content: Some("x = ____".into()),
            score: Some(u32::MAX),
            ..Default::default()
        };
        let err = editor.edit_question(1, &patch).unwrap_err();
        assert_eq!(err.messages(), vec!["总分超出上限".to_string()]);

        let patch = QuestionPatch {
            score: Some(u32::MAX - 6),
            ..patch
        };
        let draft = editor.edit_question(1, &patch).unwrap();
        assert_eq!(draft.total_score, u32::MAX);
        assert_total_consistent(draft);

        assert!(editor.duplicate_question(2).is_err());
        assert!(editor.add_question("short").is_err());
        assert_eq!(editor.last_issued_id(), 2);
        assert_total_consistent(editor.draft());
    }

    #[tokio::test]
    async fn test_select_all_and_clear() {
        let mut editor = editor();
        editor.add_question("fill").unwrap();
        editor.add_question("fill").unwrap();
        editor.select_all(true);
        assert_eq!(editor.selection_state(), SelectionState::All);
        editor.select_all(false);
        assert_eq!(editor.selection_state(), SelectionState::None);
    }

    #[tokio::test]
    async fn test_remove_option_remaps_answers() {
        let mut editor = editor();
        editor.add_question("multiple").unwrap();
        let mut patch = choice_patch("选出偶数", 1);
        patch.correct_answers = Some(BTreeSet::from([1, 3]));
        editor.edit_question(1, &patch).unwrap();

        let draft = editor.remove_option(1, 0).unwrap();
        let q = &draft.questions[0];
        assert_eq!(q.options, vec!["4", "5", "6"]);
        assert_eq!(q.correct_answers, BTreeSet::from([0, 2]));

        let draft = editor.remove_option(1, 0).unwrap();
        assert_eq!(draft.questions[0].correct_answers, BTreeSet::from([1]));

        assert!(editor.remove_option(1, 0).is_err());
        assert_eq!(
            editor.update_option(1, 5, "x").unwrap_err(),
            DraftError::OutOfRange { index: 5, len: 2 }
        );
    }

    #[tokio::test]
    async fn test_option_ops_reject_non_choice() {
        let mut editor = editor();
        editor.add_question("essay").unwrap();
        assert!(matches!(editor.add_option(1), Err(DraftError::InvalidInput(_))));
        editor.add_question("choice").unwrap();
        let draft = editor.add_option(2).unwrap();
        assert_eq!(draft.questions[1].options.len(), 5);
        let draft = editor.update_option(2, 4, " 以上都不对 ").unwrap();
        assert_eq!(draft.questions[1].options[4], "以上都不对");
    }

    #[tokio::test]
    async fn test_template_load_never_reuses_ids() {
        let mut editor = editor();
        editor.add_question("fill").unwrap();
        editor.add_question("fill").unwrap();
        editor.toggle_select(2).unwrap();

        let draft = editor
            .load_template(PaperTemplate::builtin("english-basic"))
            .unwrap();
        let ids: Vec<_> = draft.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(draft.total_score, 33);
        assert!(editor.selection().is_empty());

        let draft = editor.add_question("short").unwrap();
        assert_eq!(draft.questions.last().unwrap().id, 6);
    }

    #[tokio::test]
    async fn test_notifier_sees_consistent_snapshot() {
        let seen: Rc<RefCell<Vec<(u32, u32, usize)>>> = Rc::default();
        let sink = seen.clone();
        let mut editor = editor().with_notifier(move |d: &PaperDraft, s: &BTreeSet<QuestionId>| {
            let sum = d.questions.iter().map(|q| q.score).sum();
            sink.borrow_mut().push((d.total_score, sum, s.len()));
        });

        editor.add_question("essay").unwrap();
        editor.add_question("short").unwrap();
        editor.toggle_select(1).unwrap();
        editor.batch_set_score(3).unwrap();
        let _ = editor.delete_question(42);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|(total, sum, _)| total == sum));
        assert_eq!(seen[3], (13, 13, 1));
    }

    #[tokio::test]
    async fn test_recovery_declined_keeps_stored_copy() {
        let mut storage = MemoryStorage::new();
        storage
            .set(DRAFT_STORAGE_KEY, r#"{"name":"旧草稿","questions":[{"id":7,"type":"fill","score":6}]}"#)
            .unwrap();
        let mut editor = DraftEditor::new(storage, AutosaveSettings::default());

        let outcome = editor.offer_recovery(&mut |_: &PaperDraft| false);
        assert_eq!(outcome, RecoveryOutcome::Declined);
        assert!(editor.draft().questions.is_empty());
        assert!(editor.autosave().storage().get(DRAFT_STORAGE_KEY).unwrap().is_some());

        let outcome = editor.offer_recovery(&mut |d: &PaperDraft| d.name == "旧草稿");
        assert_eq!(outcome, RecoveryOutcome::Restored { questions: 1 });
        assert_eq!(editor.draft().total_score, 6);
        let draft = editor.add_question("fill").unwrap();
        assert_eq!(draft.questions[1].id, 8);
    }

    #[tokio::test]
    async fn test_recovery_rejects_inconsistent_draft() {
        let mut storage = MemoryStorage::new();
        let stored = r#"{"questions":[
            {"id":3,"type":"fill","content":"a","score":6},
            {"id":3,"type":"choice","content":"b","score":4,"options":["x"],"correctAnswers":[7]}
        ]}"#;
        storage.set(DRAFT_STORAGE_KEY, stored).unwrap();
        let mut editor = DraftEditor::new(storage, AutosaveSettings::default());

        let outcome = editor.offer_recovery(&mut |_: &PaperDraft| true);
        assert!(matches!(outcome, RecoveryOutcome::Unreadable { .. }));
        assert!(editor.draft().questions.is_empty());
    }

    #[tokio::test]
    async fn test_periodic_save_skipped_until_content_changes() {
        let mut storage = MemoryStorage::new();
        let stored = r#"{"name":"旧草稿","questions":[{"id":7,"type":"fill","score":6}]}"#;
        storage.set(DRAFT_STORAGE_KEY, stored).unwrap();
        let mut editor = DraftEditor::new(storage, AutosaveSettings::default());

        assert_eq!(
            editor.offer_recovery(&mut |_: &PaperDraft| false),
            RecoveryOutcome::Declined
        );
        assert_eq!(editor.save_periodic(), None);
        assert_eq!(
            editor.autosave().storage().get(DRAFT_STORAGE_KEY).unwrap().as_deref(),
            Some(stored)
        );

        editor.add_question("fill").unwrap();
        assert!(editor.save_periodic().unwrap().is_saved());
    }

    #[tokio::test]
    async fn test_save_and_publish_transitions() {
        let mut editor = editor();
        editor.add_question("choice").unwrap();
        assert!(matches!(
            editor.save_draft(),
            Err(DraftError::ValidationFailed(_))
        ));

        editor.set_field(DraftField::Name, "月考").unwrap();
        editor.set_field(DraftField::Subject, "math").unwrap();
        let patch = QuestionPatch {
            content: Some("2+2=?".into()),
            options: Some(vec!["3".into(), "4".into()]),
            correct_answers: Some(BTreeSet::from([1])),
            ..Default::default()
        };
        editor.edit_question(1, &patch).unwrap();

        let report = editor.save_draft().unwrap();
        assert!(report.is_saved());
        assert!(!editor.autosave().is_pending());

        let receipt = editor.publish().unwrap();
        assert_eq!(receipt.paper.name, "月考");
        assert_eq!(receipt.storage_warning, None);
        assert!(editor.autosave().storage().is_empty());
        assert!(!editor.has_unsaved_content());

        let draft = editor.add_question("fill").unwrap();
        assert_eq!(draft.questions[0].id, 2);
    }

    #[tokio::test]
    async fn test_preview_requires_name() {
        let mut editor = editor();
        assert!(editor.preview().is_err());
        editor.set_field(DraftField::Name, "练习").unwrap();
        assert!(editor.preview().unwrap().starts_with("练习\n"));
    }
}
