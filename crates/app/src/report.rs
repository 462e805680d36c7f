use serde::{Deserialize, Serialize};
use std::path::Path;
use tickcorr_analysis::pipeline::{Analysis, SampleDiagnostics};
use tickcorr_core::analysis::entity::{
    AlignedFrame, CorrelationResult, ReturnStats, ReturnsFrame,
};
use tickcorr_core::common::{ResampleStep, TimeWindow};
use tracing::info;

/// # Summary
/// 一次分析运行的对外报告，供绘图或下游工具读取。
///
/// # Invariants
/// - 只在流水线全部阶段成功后构造，不存在部分报告。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub window: TimeWindow,
    pub step: ResampleStep,
    pub sampled: Vec<SampleDiagnostics>,
    pub aligned: AlignedFrame,
    pub returns: ReturnsFrame,
    pub return_stats: Vec<ReturnStats>,
    pub correlation: CorrelationResult,
}

impl AnalysisReport {
    pub fn new(window: TimeWindow, step: ResampleStep, analysis: Analysis) -> Self {
        Self {
            window,
            step,
            sampled: analysis.sampled,
            aligned: analysis.aligned,
            returns: analysis.percent_returns,
            return_stats: analysis.return_stats,
            correlation: analysis.correlation,
        }
    }

    /// 通过日志输出报告摘要。
    pub fn log_summary(&self) {
        info!("Window {} at step {}", self.window, self.step);
        for diag in &self.sampled {
            info!(
                "{}: {} ticks -> {} buckets ({} forward-filled, longest run {})",
                diag.instrument,
                diag.ticks,
                diag.buckets,
                diag.filled_buckets,
                diag.longest_fill_run
            );
        }
        info!("Aligned intervals: {}", self.aligned.len());
        for stats in &self.return_stats {
            match stats.std_dev {
                Some(std_dev) => info!(
                    "{}: mean {:.6e}, std {:.6e}, min {:.6e}, max {:.6e} over {} returns",
                    stats.instrument, stats.mean, std_dev, stats.min, stats.max, stats.count
                ),
                None => info!(
                    "{}: mean {:.6e}, min {:.6e}, max {:.6e} over {} returns",
                    stats.instrument, stats.mean, stats.min, stats.max, stats.count
                ),
            }
        }
        info!(
            "Correlation between {} and {}: {:.6} ({})",
            self.correlation.instrument_a,
            self.correlation.instrument_b,
            self.correlation.coefficient,
            self.correlation.classification
        );
    }

    /// # Summary
    /// 以格式化 JSON 写出报告，已存在的文件会被覆盖。
    ///
    /// # Arguments
    /// * `path`: 输出文件路径，父目录不存在时自动创建。
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}
