//! # Paper Draft
//!
//! 试卷编辑器的草稿状态管理
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有存储与定时器，只暴露能力
//! - `DraftStorage` - 单键字符串存储（内存 / 文件）
//! - `SaveTimer` - 可重置的防抖截止时间
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有会话状态
//! - `DraftStore` - 草稿与ID计数器
//! - `validation` - 保存 / 发布校验
//! - `AutosaveGateway` - 防抖保存、周期保存、草稿恢复
//! - `preview` - 题目列表与预览渲染
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义草稿的全部变更操作
//! - `DraftEditor` - 变更 → 重算总分 → 安排保存 → 通知界面
//! - `Selection` - 题目勾选集合
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/console` - 控制台应用，驱动输入与定时器
//! - `orchestrator/command` - 控制台命令解析
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{DraftError, DraftResult, StorageError};
pub use infrastructure::{DraftStorage, FileStorage, MemoryStorage};
pub use models::{PaperDraft, PaperTemplate, Question, QuestionId, QuestionPatch, QuestionType, Subject};
pub use orchestrator::App;
pub use services::{AutosaveSettings, SaveReport};
pub use workflow::{DraftEditor, RecoveryOutcome, SelectionState};
