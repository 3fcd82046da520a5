//! 保存定时器 - 基础设施层
//!
//! 防抖定时器以截止时间表示，由事件循环等待；不持有任何草稿数据

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// 可重置、可取消的防抖定时器
#[derive(Debug, Clone)]
pub struct SaveTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 启动或重置定时器，返回新的截止时间
    pub fn arm(&mut self) -> Instant {
        let deadline = Instant::now() + self.delay;
        self.deadline = Some(deadline);
        deadline
    }

    /// 取消等待中的定时器，返回之前是否在等待
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 到期则清除并返回 true
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// 等待截止时间；没有截止时间时永不返回
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// 固定周期定时器，第一次触发在一个周期之后
pub fn periodic(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
