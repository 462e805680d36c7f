use chrono::{DateTime, Utc};
use std::sync::RwLock;

/// # Summary
/// 时间供给器接口，用于隔离物理系统时钟。
/// 默认分析时间窗（当日零点至当前时刻）必须通过此接口获取当前时间。
pub trait TimeProvider: Send + Sync {
    /// 获取当前时间
    fn now(&self) -> DateTime<Utc>;
}

/// # Summary
/// 真实时钟，直接返回操作系统当前时间。
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 测试专用虚拟时钟，允许固定或拨动当前时间。
///
/// # Invariants
/// - 并发安全：内部利用 `RwLock` 提供多线程安全的读写。
pub struct FakeClockProvider {
    current_time: RwLock<DateTime<Utc>>,
}

impl FakeClockProvider {
    /// 使用指定的初始时间创建虚拟时钟
    pub fn new(initial_time: DateTime<Utc>) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// 强制修改时钟的当前时间
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        let mut time = self.current_time.write().unwrap_or_else(|e| e.into_inner());
        *time = new_time;
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        *self.current_time.read().unwrap_or_else(|e| e.into_inner())
    }
}
