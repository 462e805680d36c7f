use tickcorr_core::analysis::entity::{AlignedFrame, ReturnKind, ReturnStats, ReturnsFrame};
use tickcorr_core::analysis::error::AnalysisError;

/// # Summary
/// 由对齐价格表计算逐行的绝对收益与百分比收益。
///
/// # Logic
/// 1. 对齐表少于 2 行时返回两张零行表。
/// 2. 每列独立计算 `v[i] - v[i-1]` 与 `(v[i] - v[i-1]) / v[i-1]`，丢弃首行。
/// 3. 前值恰为 0 时不产生非有限数，直接返回 `AnalysisError::DivisionByZero`。
///
/// # Arguments
/// * `frame`: 对齐价格表。
///
/// # Returns
/// 成功返回 (绝对收益表, 百分比收益表)。
pub fn returns(frame: &AlignedFrame) -> Result<(ReturnsFrame, ReturnsFrame), AnalysisError> {
    if frame.len() < 2 {
        return Ok((
            ReturnsFrame::empty(ReturnKind::Absolute, frame.instruments.clone()),
            ReturnsFrame::empty(ReturnKind::Percent, frame.instruments.clone()),
        ));
    }

    let instants: Vec<_> = frame.instants.iter().skip(1).copied().collect();
    let mut absolute = Vec::with_capacity(frame.columns.len());
    let mut percent = Vec::with_capacity(frame.columns.len());

    for (instrument, column) in frame.instruments.iter().zip(&frame.columns) {
        let pairs = column.iter().zip(column.iter().skip(1));

        absolute.push(pairs.clone().map(|(prev, cur)| cur - prev).collect());

        let mut pct = Vec::with_capacity(instants.len());
        for ((prev, cur), at) in pairs.zip(&frame.instants) {
            if *prev == 0.0 {
                return Err(AnalysisError::DivisionByZero {
                    instrument: instrument.symbol.clone(),
                    at: *at,
                });
            }
            pct.push((cur - prev) / prev);
        }
        percent.push(pct);
    }

    Ok((
        ReturnsFrame {
            kind: ReturnKind::Absolute,
            instruments: frame.instruments.clone(),
            instants: instants.clone(),
            columns: absolute,
        },
        ReturnsFrame {
            kind: ReturnKind::Percent,
            instruments: frame.instruments.clone(),
            instants,
            columns: percent,
        },
    ))
}

/// # Summary
/// 计算收益率表每一列的描述统计。
///
/// # Logic
/// 1. 零行的列不产生统计项。
/// 2. 标准差使用样本口径 (n-1)，单个样本时为 None。
pub fn return_stats(frame: &ReturnsFrame) -> Vec<ReturnStats> {
    frame
        .instruments
        .iter()
        .zip(&frame.columns)
        .filter(|(_, column)| !column.is_empty())
        .map(|(instrument, column)| {
            let (n, sum) = column.iter().fold((0.0, 0.0), |(n, s), v| (n + 1.0, s + v));
            let mean = sum / n;
            let std_dev = (column.len() > 1).then(|| {
                let ss: f64 = column.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (n - 1.0)).sqrt()
            });
            ReturnStats {
                instrument: instrument.clone(),
                count: column.len(),
                mean,
                std_dev,
                min: column.iter().copied().fold(f64::INFINITY, f64::min),
                max: column.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}
