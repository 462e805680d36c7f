use tickcorr_core::analysis::entity::{CorrelationResult, CorrelationThresholds, ReturnsFrame};
use tickcorr_core::analysis::error::AnalysisError;
use tickcorr_core::common::Instrument;

/// # Summary
/// 计算两个标的百分比收益之间的 Pearson 相关系数并分类。
///
/// # Logic
/// 1. 定位两个标的的收益列，不存在则返回 `UnknownInstrument`。
/// 2. 行数少于 2 时返回 `InsufficientData`。
/// 3. 任一列为常数（方差为 0，或偏差平方下溢为 0）时系数无定义，返回 `ConstantSeries`。
/// 4. 以 `cov / sqrt(var_a * var_b)` 计算系数并截断到 `[-1, 1]`。
/// 5. 按阈值分类。
///
/// # Arguments
/// * `percent_returns`: 百分比收益表。
/// * `instrument_a`, `instrument_b`: 两个标的代码。
/// * `thresholds`: 分类阈值。
///
/// # Returns
/// 成功返回 `CorrelationResult`。
pub fn analyze(
    percent_returns: &ReturnsFrame,
    instrument_a: &str,
    instrument_b: &str,
    thresholds: &CorrelationThresholds,
) -> Result<CorrelationResult, AnalysisError> {
    let (a, xs) = lookup(percent_returns, instrument_a)?;
    let (b, ys) = lookup(percent_returns, instrument_b)?;

    let rows = percent_returns.len();
    if rows < 2 {
        return Err(AnalysisError::InsufficientData { rows });
    }
    for (instrument, column) in [(a, xs), (b, ys)] {
        if is_constant(column) {
            return Err(AnalysisError::ConstantSeries {
                instrument: instrument.symbol.clone(),
            });
        }
    }

    let coefficient = pearson(xs, ys).map_err(|column| {
        let instrument = match column {
            Column::A => a,
            Column::B => b,
        };
        AnalysisError::ConstantSeries {
            instrument: instrument.symbol.clone(),
        }
    })?;
    Ok(CorrelationResult {
        instrument_a: a.clone(),
        instrument_b: b.clone(),
        coefficient,
        sample_size: rows,
        classification: thresholds.classify(coefficient),
    })
}

fn lookup<'a>(
    frame: &'a ReturnsFrame,
    symbol: &str,
) -> Result<(&'a Instrument, &'a [f64]), AnalysisError> {
    let instrument = frame
        .instruments
        .iter()
        .find(|i| i.symbol == symbol)
        .ok_or_else(|| AnalysisError::UnknownInstrument(symbol.to_string()))?;
    let column = frame
        .column(symbol)
        .ok_or_else(|| AnalysisError::UnknownInstrument(symbol.to_string()))?;
    Ok((instrument, column))
}

fn is_constant(column: &[f64]) -> bool {
    column.windows(2).all(|w| w.first() == w.last())
}

/// 数值上退化的列
#[derive(Debug, PartialEq)]
enum Column {
    A,
    B,
}

// 调用方保证两列等长、至少 2 行且均非常数。
// 偏差平方下溢为 0 时系数不是有限数，返回方差较小的一列。
fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, Column> {
    let mean = |v: &[f64]| {
        let (n, sum) = v.iter().fold((0.0, 0.0), |(n, s), x| (n + 1.0, s + x));
        sum / n
    };
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // sqrt(v * v) == v 精确成立，保证完全相同的两列得到恰好 1.0
    let raw = cov / (var_x * var_y).sqrt();
    if !raw.is_finite() {
        return Err(if var_x <= var_y { Column::A } else { Column::B });
    }
    Ok(raw.clamp(-1.0, 1.0))
}
