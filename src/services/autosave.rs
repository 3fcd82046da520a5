//! 自动保存与草稿恢复
//!
//! - 每次内容变更后防抖保存，静默期内的新变更会重置定时器
//! - 固定周期强制保存，限定连续编辑时的数据丢失窗口
//! - 存储失败只产生警告，内存中的草稿始终为准

use crate::config::Config;
use crate::error::StorageError;
use crate::infrastructure::{periodic, DraftStorage, SaveTimer};
use crate::models::PaperDraft;
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::time::{Instant, Interval};
use tracing::{debug, info, warn};

/// 草稿在存储中的键名
pub const DRAFT_STORAGE_KEY: &str = "paperDraft";

/// 自动保存参数
#[derive(Debug, Clone)]
pub struct AutosaveSettings {
    pub storage_key: String,
    pub debounce: Duration,
    pub interval: Duration,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            storage_key: DRAFT_STORAGE_KEY.to_string(),
            debounce: Duration::from_secs(2),
            interval: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for AutosaveSettings {
    fn from(config: &Config) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            debounce: Duration::from_millis(config.autosave_debounce_ms),
            interval: Duration::from_secs(config.autosave_interval_secs),
        }
    }
}

/// 触发保存的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    /// 防抖定时器到期
    Debounced,
    /// 周期定时器
    Periodic,
    /// 用户主动保存草稿
    Manual,
}

impl SaveTrigger {
    fn label(self) -> &'static str {
        match self {
            SaveTrigger::Debounced | SaveTrigger::Periodic => "已自动保存",
            SaveTrigger::Manual => "草稿保存成功",
        }
    }
}

/// 一次保存的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReport {
    Saved {
        trigger: SaveTrigger,
        bytes: usize,
        at: DateTime<Local>,
    },
    /// 存储失败（非致命）
    Failed { trigger: SaveTrigger, warning: String },
}

impl SaveReport {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveReport::Saved { .. })
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            SaveReport::Failed { warning, .. } => Some(warning),
            SaveReport::Saved { .. } => None,
        }
    }
}

impl std::fmt::Display for SaveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveReport::Saved { trigger, at, .. } => {
                write!(f, "{} ({})", trigger.label(), at.format("%H:%M:%S"))
            }
            SaveReport::Failed { warning, .. } => write!(f, "保存失败: {}", warning),
        }
    }
}

/// 读取已保存草稿的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredDraft {
    Missing,
    Found(PaperDraft),
    /// 读取或解析失败
    Unreadable(String),
}

/// 草稿恢复确认
///
/// 由界面层决定是否恢复检测到的草稿
pub trait RecoveryPrompt {
    fn confirm_restore(&mut self, draft: &PaperDraft) -> bool;
}

impl<F> RecoveryPrompt for F
where
    F: FnMut(&PaperDraft) -> bool,
{
    fn confirm_restore(&mut self, draft: &PaperDraft) -> bool {
        self(draft)
    }
}

/// 自动保存网关
///
/// 职责：
/// - 持有存储与防抖定时器
/// - 序列化草稿并写入单个键
/// - 读取、清除已保存的草稿
pub struct AutosaveGateway<S> {
    storage: S,
    settings: AutosaveSettings,
    debounce: SaveTimer,
    /// 本次会话是否修改过草稿内容
    changed: bool,
}

impl<S: DraftStorage> AutosaveGateway<S> {
    pub fn new(storage: S, settings: AutosaveSettings) -> Self {
        let debounce = SaveTimer::new(settings.debounce);
        Self {
            storage,
            settings,
            debounce,
            changed: false,
        }
    }

    pub fn settings(&self) -> &AutosaveSettings {
        &self.settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// 安排一次防抖保存（已有等待中的保存时重置定时器）
    pub fn schedule(&mut self) {
        self.changed = true;
        let deadline = self.debounce.arm();
        debug!("安排自动保存: {:?} 后执行", deadline - Instant::now());
    }

    /// 会话开始（或上次发布）以来是否有内容变更
    ///
    /// 周期保存以此为前提，未变更的空白会话不会覆盖已保存的草稿
    pub fn has_changes(&self) -> bool {
        self.changed
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// 防抖保存的截止时间，供事件循环等待
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn cancel_pending(&mut self) -> bool {
        self.debounce.cancel()
    }

    /// 创建周期保存定时器
    pub fn periodic_timer(&self) -> Interval {
        periodic(self.settings.interval)
    }

    /// 防抖定时器到期时保存，否则返回 None
    pub fn flush_if_due(&mut self, draft: &PaperDraft, now: Instant) -> Option<SaveReport> {
        if self.debounce.take_due(now) {
            Some(self.save(draft, SaveTrigger::Debounced))
        } else {
            None
        }
    }

    /// 立即保存草稿
    pub fn save(&mut self, draft: &PaperDraft, trigger: SaveTrigger) -> SaveReport {
        let serialized = match serde_json::to_string(draft) {
            Ok(s) => s,
            Err(e) => {
                warn!("⚠️ 草稿序列化失败: {}", e);
                return SaveReport::Failed {
                    trigger,
                    warning: format!("草稿序列化失败: {}", e),
                };
            }
        };

        match self.storage.set(&self.settings.storage_key, &serialized) {
            Ok(()) => {
                debug!(
                    "💾 草稿已写入 {} ({} 字节, {:?})",
                    self.settings.storage_key,
                    serialized.len(),
                    trigger
                );
                SaveReport::Saved {
                    trigger,
                    bytes: serialized.len(),
                    at: Local::now(),
                }
            }
            Err(e) => {
                warn!("⚠️ 保存草稿失败: {}", e);
                SaveReport::Failed {
                    trigger,
                    warning: e.to_string(),
                }
            }
        }
    }

    /// 读取已保存的草稿，不修改存储
    ///
    /// 不满足数据约束的草稿视为无法读取
    pub fn load(&self) -> StoredDraft {
        let raw = match self.storage.get(&self.settings.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredDraft::Missing,
            Err(e) => {
                warn!("⚠️ 读取草稿失败: {}", e);
                return StoredDraft::Unreadable(e.to_string());
            }
        };

        match serde_json::from_str::<PaperDraft>(&raw) {
            Ok(mut draft) => {
                let violations = draft.integrity_violations();
                if !violations.is_empty() {
                    warn!("⚠️ 草稿数据不一致: {:?}", violations);
                    return StoredDraft::Unreadable(format!(
                        "草稿数据不一致: {}",
                        violations.join("；")
                    ));
                }
                draft.recompute_total();
                StoredDraft::Found(draft)
            }
            Err(e) => {
                warn!("⚠️ 加载草稿失败: {}", e);
                StoredDraft::Unreadable(format!("草稿格式错误: {}", e))
            }
        }
    }

    /// 清除已保存的草稿（发布成功后调用）
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.debounce.cancel();
        self.changed = false;
        self.storage.remove(&self.settings.storage_key)?;
        info!("🗑️ 已清除本地草稿");
        Ok(())
    }
}
