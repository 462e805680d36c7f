use crate::analysis::error::AnalysisError;
use crate::common::Instrument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单笔成交/报价观测，记录某一时刻的价格。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    // 观测时间 (UTC，微秒精度)
    pub timestamp: DateTime<Utc>,
    // 价格 (外汇取 bid，数字货币取成交价)
    pub price: f64,
}

impl Tick {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// # Summary
/// 单一标的在某个时间窗内的 tick 序列。
///
/// # Invariants
/// - 按时间戳非递减排列；同一时间戳的多笔 tick 保持到达顺序。
/// - 所有价格均为有限数。
/// - 构造后不可变。
#[derive(Debug, Clone, Serialize)]
pub struct TickSeries {
    instrument: Instrument,
    ticks: Vec<Tick>,
}

impl TickSeries {
    /// # Summary
    /// 构造并校验 tick 序列。
    ///
    /// # Logic
    /// 1. 拒绝任何非有限价格 (NaN / ±inf)。
    /// 2. 按时间戳稳定排序，相同时间戳保留原始到达顺序。
    ///
    /// # Arguments
    /// * `instrument`: 所属标的。
    /// * `ticks`: 原始到达顺序的观测列表，允许为空。
    ///
    /// # Returns
    /// 成功返回序列，存在非法价格返回 `AnalysisError::InvalidPrice`。
    pub fn new(instrument: Instrument, mut ticks: Vec<Tick>) -> Result<Self, AnalysisError> {
        if let Some(bad) = ticks.iter().find(|t| !t.price.is_finite()) {
            return Err(AnalysisError::InvalidPrice {
                instrument: instrument.symbol.clone(),
                at: bad.timestamp,
            });
        }
        // sort_by_key 是稳定排序
        ticks.sort_by_key(|t| t.timestamp);
        Ok(Self { instrument, ticks })
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn symbol(&self) -> &str {
        &self.instrument.symbol
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn first(&self) -> Option<&Tick> {
        self.ticks.first()
    }

    pub fn last(&self) -> Option<&Tick> {
        self.ticks.last()
    }
}
