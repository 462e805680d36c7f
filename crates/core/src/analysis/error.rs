use chrono::{DateTime, Utc};
use thiserror::Error;

/// # Summary
/// 分析流水线错误枚举，覆盖重采样、对齐、收益率与相关性各阶段。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 在检测点立即返回，流水线内部不做任何降级或补全。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// tick 序列为空，无法重采样
    #[error("Empty input: no ticks for {instrument}")]
    EmptyInput { instrument: String },
    /// tick 价格不是有限数
    #[error("Invalid price for {instrument} at {at}")]
    InvalidPrice {
        instrument: String,
        at: DateTime<Utc>,
    },
    /// 对齐时未提供任何序列
    #[error("No series to align")]
    NoSeries,
    /// 百分比收益的前值为 0
    #[error("Division by zero: {instrument} has a zero price at {at}")]
    DivisionByZero {
        instrument: String,
        at: DateTime<Utc>,
    },
    /// 对齐后的样本不足以计算相关系数
    #[error("Insufficient data: {rows} return rows, at least 2 required")]
    InsufficientData { rows: usize },
    /// 收益率表中不存在该标的列
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),
    /// 某列收益率方差为 0，相关系数无定义
    #[error("Constant series: {instrument} has zero return variance")]
    ConstantSeries { instrument: String },
    /// 相关性分析需要恰好两个标的
    #[error("Expected exactly 2 instruments, got {0}")]
    InstrumentCount(usize),
    /// 网格时间点超出可表示的时间范围
    #[error("Grid overflow: {instrument} buckets of {step_micros}us exceed the supported time range")]
    GridOverflow {
        instrument: String,
        step_micros: i64,
    },
    /// 配置的标的没有对应的 tick 序列
    #[error("Missing tick series for {0}")]
    MissingSeries(String),
}
