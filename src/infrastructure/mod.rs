//! 基础设施层：持有存储与定时器，只暴露能力

pub mod save_timer;
pub mod storage;

pub use save_timer::{periodic, sleep_until_deadline, SaveTimer};
pub use storage::{DraftStorage, FileStorage, MemoryStorage};
