use tickcorr_core::analysis::entity::SampledSeries;
use tickcorr_core::analysis::error::AnalysisError;
use tickcorr_core::common::ResampleStep;
use tickcorr_core::market::entity::TickSeries;
use tracing::debug;

/// # Summary
/// 将不规则 tick 序列重采样为固定步长的阶梯序列。
///
/// # Logic
/// 1. 以首笔、末笔 tick 的桶边界确定网格范围 `[start, end]`。
/// 2. 逐桶推进，取桶内最后一笔 tick 的价格作为代表值（同一时间戳以到达顺序为准）。
/// 3. 空桶沿用前一桶的值，并累计前向填充统计。
///
/// # Arguments
/// * `series`: 已按时间排序的 tick 序列。
/// * `step`: 网格步长。
///
/// # Returns
/// 成功返回 `SampledSeries`；序列为空返回 `AnalysisError::EmptyInput`，
/// 网格越过可表示的时间上限返回 `AnalysisError::GridOverflow`。
pub fn resample(series: &TickSeries, step: ResampleStep) -> Result<SampledSeries, AnalysisError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(AnalysisError::EmptyInput {
                instrument: series.symbol().to_string(),
            });
        }
    };

    let start = step.floor(first.timestamp);
    let end = step.floor(last.timestamp);
    let delta = step.as_delta();

    let mut ticks = series.ticks().iter().peekable();
    let mut values = Vec::new();
    let mut carried: Option<f64> = None;
    let mut filled_buckets: usize = 0;
    let mut fill_run: usize = 0;
    let mut longest_fill_run: usize = 0;

    let mut bucket = start;
    while bucket <= end {
        let next = bucket
            .checked_add_signed(delta)
            .ok_or_else(|| AnalysisError::GridOverflow {
                instrument: series.symbol().to_string(),
                step_micros: step.as_micros(),
            })?;
        let mut observed = None;
        while let Some(tick) = ticks.next_if(|t| t.timestamp < next) {
            observed = Some(tick.price);
        }

        match observed {
            Some(price) => {
                carried = Some(price);
                fill_run = 0;
            }
            None => {
                filled_buckets += 1;
                fill_run += 1;
                longest_fill_run = longest_fill_run.max(fill_run);
            }
        }

        // 首桶必含首笔 tick，carried 从首桶起始终有值
        if let Some(price) = carried {
            values.push(price);
        }
        bucket = next;
    }

    debug!(
        "Resampled {} ticks of {} into {} buckets at {} ({} forward-filled)",
        series.len(),
        series.symbol(),
        values.len(),
        step,
        filled_buckets
    );

    Ok(SampledSeries {
        instrument: series.instrument().clone(),
        step,
        start,
        values,
        filled_buckets,
        longest_fill_run,
    })
}
