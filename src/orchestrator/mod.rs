//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把控制台输入翻译成编辑操作，并驱动自动保存的两个定时器。
//!
//! ## 模块划分
//!
//! ### `command` - 命令解析
//! - 把一行文本解析为 `Command`
//! - 位置从 1 开始，选项用字母表示
//!
//! ### `console` - 控制台应用
//! - 管理应用生命周期（初始化、恢复草稿、运行、退出）
//! - 加载自定义模板
//! - 在同一个事件循环里等待输入、防抖截止时间和周期定时器
//!
//! ## 层次关系
//!
//! ```text
//! console (stdin + 定时器)
//!     ↓
//! workflow::DraftEditor (全部变更操作)
//!     ↓
//! services (能力层：store / validation / autosave / preview)
//!     ↓
//! infrastructure (基础设施：DraftStorage / SaveTimer)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单线程**：草稿只在事件循环所在的任务中修改
//! 2. **资源隔离**：只有编排层持有标准输入和定时器的等待
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做解析和调度，不做具体业务判断

pub mod command;
pub mod console;

// 重新导出主要类型
pub use command::Command;
pub use console::App;
