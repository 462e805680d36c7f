use super::error::StoreError;
use crate::common::{Instrument, TimeWindow};
use crate::market::entity::TickSeries;
use async_trait::async_trait;

/// # Summary
/// 原始 tick 数据存储接口，负责采集结果的落盘与回放读取。
///
/// # Invariants
/// - 存储只保存原始 tick，不保存任何分析中间结果。
/// - 读取结果须按时间排序，同一时间戳保持写入顺序。
#[async_trait]
pub trait TickStore: Send + Sync {
    /// # Summary
    /// 保存一个标的的完整 tick 序列。
    ///
    /// # Arguments
    /// * `series`: 待保存的序列。
    /// * `label`: 会话标签（通常为交易日），用于区分不同批次。
    ///
    /// # Returns
    /// 成功返回 Ok，失败返回 `StoreError`。
    async fn save_ticks(&self, series: &TickSeries, label: &str) -> Result<(), StoreError>;

    /// # Summary
    /// 读取一个标的在 `[from, to)` 内的 tick。
    ///
    /// # Arguments
    /// * `instrument`: 目标标的。
    /// * `window`: 左闭右开时间窗。
    ///
    /// # Returns
    /// 成功返回 tick 序列（可能为空）。
    async fn load_ticks(
        &self,
        instrument: &Instrument,
        window: TimeWindow,
    ) -> Result<TickSeries, StoreError>;
}
