use crate::align::align;
use crate::correlation::analyze;
use crate::resample::resample;
use crate::returns::{return_stats, returns};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tickcorr_core::analysis::entity::{
    AlignedFrame, CorrelationResult, ReturnStats, ReturnsFrame, SampledSeries,
};
use tickcorr_core::analysis::error::AnalysisError;
use tickcorr_core::common::Instrument;
use tickcorr_core::config::AnalysisConfig;
use tickcorr_core::market::entity::TickSeries;
use tracing::{info, warn};

/// # Summary
/// 单个标的重采样后的数据质量诊断。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDiagnostics {
    pub instrument: Instrument,
    // 原始 tick 数
    pub ticks: usize,
    // 网格桶数
    pub buckets: usize,
    pub filled_buckets: usize,
    pub longest_fill_run: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SampleDiagnostics {
    fn new(ticks: usize, sampled: &SampledSeries) -> Self {
        Self {
            instrument: sampled.instrument.clone(),
            ticks,
            buckets: sampled.len(),
            filled_buckets: sampled.filled_buckets,
            longest_fill_run: sampled.longest_fill_run,
            start: sampled.start,
            end: sampled.end().unwrap_or(sampled.start),
        }
    }
}

/// # Summary
/// 一次完整分析运行的产出，供报告与绘图方直接消费。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub sampled: Vec<SampleDiagnostics>,
    pub aligned: AlignedFrame,
    pub absolute_returns: ReturnsFrame,
    pub percent_returns: ReturnsFrame,
    pub return_stats: Vec<ReturnStats>,
    pub correlation: CorrelationResult,
}

/// # Summary
/// 重采样 → 对齐 → 收益率 → 相关性 的批处理流水线。
///
/// # Invariants
/// - 配置在构造时注入，运行期间只读。
/// - 任一阶段失败立即返回，不产出部分结果。
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// # Summary
    /// 对已获取的 tick 序列执行完整分析。
    ///
    /// # Logic
    /// 1. 校验配置恰好包含两个标的，并按配置顺序为每个标的匹配 tick 序列。
    /// 2. 逐个重采样，连续前向填充过长时告警。
    /// 3. 对齐、计算收益率与描述统计。
    /// 4. 计算相关系数并分类。
    ///
    /// # Arguments
    /// * `series`: 每个配置标的一条 tick 序列，顺序不限，按 symbol 匹配。
    ///
    /// # Returns
    /// 成功返回 `Analysis`，失败返回首个出错阶段的 `AnalysisError`。
    pub fn run(&self, series: &[TickSeries]) -> Result<Analysis, AnalysisError> {
        let (instrument_a, instrument_b) = match self.config.instruments.as_slice() {
            [a, b] => (a, b),
            other => return Err(AnalysisError::InstrumentCount(other.len())),
        };

        let mut sampled = Vec::with_capacity(2);
        let mut diagnostics = Vec::with_capacity(2);
        for instrument in [instrument_a, instrument_b] {
            let ticks = series
                .iter()
                .find(|s| s.symbol() == instrument.symbol)
                .ok_or_else(|| AnalysisError::MissingSeries(instrument.symbol.clone()))?;
            let resampled = resample(ticks, self.config.step)?;
            self.check_staleness(&resampled);
            diagnostics.push(SampleDiagnostics::new(ticks.len(), &resampled));
            sampled.push(resampled);
        }

        let aligned = align(&sampled)?;
        info!("Aligned: {} intervals", aligned.len());

        let (absolute_returns, percent_returns) = returns(&aligned)?;
        let return_stats = return_stats(&percent_returns);
        let correlation = analyze(
            &percent_returns,
            &instrument_a.symbol,
            &instrument_b.symbol,
            &self.config.thresholds,
        )?;

        info!(
            "{} vs {}: correlation {:.6} ({}) over {} samples",
            instrument_a,
            instrument_b,
            correlation.coefficient,
            correlation.classification,
            correlation.sample_size
        );

        Ok(Analysis {
            sampled: diagnostics,
            aligned,
            absolute_returns,
            percent_returns,
            return_stats,
            correlation,
        })
    }

    fn check_staleness(&self, sampled: &SampledSeries) {
        let Some(limit) = self.config.max_fill_steps else {
            return;
        };
        if sampled.longest_fill_run > limit {
            warn!(
                "{}: price carried forward for {} consecutive {} buckets (limit {})",
                sampled.instrument,
                sampled.longest_fill_run,
                sampled.step,
                limit
            );
        }
    }
}
