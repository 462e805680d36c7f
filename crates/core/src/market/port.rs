use crate::common::{Instrument, TimeWindow};
use crate::market::entity::TickSeries;
use crate::market::error::AcquisitionError;
use async_trait::async_trait;

/// # Summary
/// 原始 tick 数据源（外部行情供应方）的工厂接口。
///
/// # Invariants
/// - 每次 `connect` 产生一个独立会话，调用方负责在所有退出路径上关闭它。
#[async_trait]
pub trait TickSource: Send + Sync {
    /// # Summary
    /// 建立与数据源的会话。
    ///
    /// # Logic
    /// 1. 校验数据源可达（网络探测、目录存在、数据库可打开等）。
    /// 2. 返回可用于批量抓取的会话对象。
    ///
    /// # Returns
    /// 成功返回会话，失败返回 `AcquisitionError::Connection`。
    async fn connect(&self) -> Result<Box<dyn TickSession>, AcquisitionError>;
}

/// # Summary
/// 已建立的数据源会话。
///
/// # Invariants
/// - `close` 之后不得再调用 `fetch_ticks`。
#[async_trait]
pub trait TickSession: Send {
    /// # Summary
    /// 抓取单一标的在 `[from, to)` 内的全部 tick。
    ///
    /// # Arguments
    /// * `instrument`: 目标标的。
    /// * `window`: 左闭右开时间窗。
    ///
    /// # Returns
    /// 成功返回按时间排序的 tick 序列（可能为空，由调用方判定）。
    async fn fetch_ticks(
        &mut self,
        instrument: &Instrument,
        window: TimeWindow,
    ) -> Result<TickSeries, AcquisitionError>;

    /// # Summary
    /// 释放会话持有的资源。
    async fn close(self: Box<Self>);
}
