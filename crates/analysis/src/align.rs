use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tickcorr_core::analysis::entity::{AlignedFrame, SampledSeries};
use tickcorr_core::analysis::error::AnalysisError;
use tracing::{debug, warn};

/// # Summary
/// 对多个重采样序列求时间点交集，并把每个序列投影到共同网格上。
///
/// # Logic
/// 1. 为每个序列建立 时间点 -> 价格 的索引。
/// 2. 遍历第一个序列的时间点（本身严格递增），保留在所有序列中都存在的时间点。
/// 3. 按交集时间点依次取出各序列的价格，组成列。
///
/// # Arguments
/// * `series`: 至少一个重采样序列，网格起止甚至步长均可不同。
///
/// # Returns
/// 成功返回对齐表；交集为空时返回零行表而非错误；未提供序列返回 `AnalysisError::NoSeries`。
pub fn align(series: &[SampledSeries]) -> Result<AlignedFrame, AnalysisError> {
    let head = series.first().ok_or(AnalysisError::NoSeries)?;

    let lookups: Vec<HashMap<DateTime<Utc>, f64>> =
        series.iter().map(|s| s.points().collect()).collect();

    let instants: Vec<DateTime<Utc>> = head
        .points()
        .map(|(instant, _)| instant)
        .filter(|instant| lookups.iter().all(|m| m.contains_key(instant)))
        .collect();

    let columns = lookups
        .iter()
        .map(|m| instants.iter().filter_map(|t| m.get(t).copied()).collect())
        .collect();

    if instants.is_empty() {
        warn!(
            "Aligned frame is empty: no common instants across {} series",
            series.len()
        );
    } else {
        debug!("Aligned {} series on {} instants", series.len(), instants.len());
    }

    Ok(AlignedFrame {
        instruments: series.iter().map(|s| s.instrument.clone()).collect(),
        instants,
        columns,
    })
}
