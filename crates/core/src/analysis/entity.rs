use crate::common::{Instrument, ResampleStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单一标的在固定步长网格上的重采样序列。
///
/// # Invariants
/// - 时间点为连续等差数列 `start + i * step`，`i` 取 `0..values.len()`。
/// - `start` 为首笔 tick 所在桶的边界，末个时间点为最后一笔 tick 所在桶的边界。
/// - 每个值要么是桶内最后一笔 tick 的价格，要么是前一桶的前向填充值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledSeries {
    // 所属标的
    pub instrument: Instrument,
    // 网格步长
    pub step: ResampleStep,
    // 首个桶的边界
    pub start: DateTime<Utc>,
    // 每个桶的代表价格
    pub values: Vec<f64>,
    // 前向填充的桶数
    pub filled_buckets: usize,
    // 最长连续前向填充的桶数，用于判断价格陈旧程度
    pub longest_fill_run: usize,
}

impl SampledSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按时间顺序产出 (时间点, 价格)；时间点超出可表示范围时提前结束。
    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        let step = self.step.as_delta();
        self.values.iter().scan(Some(self.start), move |instant, value| {
            let current = (*instant)?;
            *instant = current.checked_add_signed(step);
            Some((current, *value))
        })
    }

    /// 末个桶的边界；空序列返回 None。
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.points().last().map(|(instant, _)| instant)
    }
}

/// # Summary
/// 多个标的在共同时间网格上的对齐价格表。
///
/// # Invariants
/// - `instants` 严格递增。
/// - `columns.len() == instruments.len()`，且每列长度等于 `instants.len()`。
/// - 列顺序与 `instruments` 顺序一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedFrame {
    pub instruments: Vec<Instrument>,
    pub instants: Vec<DateTime<Utc>>,
    pub columns: Vec<Vec<f64>>,
}

impl AlignedFrame {
    /// 行数，即共同时间点个数。
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        column_of(&self.instruments, &self.columns, symbol)
    }
}

/// # Summary
/// 收益率种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    // 绝对差值 v[i] - v[i-1]
    Absolute,
    // 百分比变化 (v[i] - v[i-1]) / v[i-1]
    Percent,
}

/// # Summary
/// 由对齐价格表逐行差分得到的收益率表。
///
/// # Invariants
/// - 行数 = 对齐表行数 - 1（对齐表少于 2 行时为 0）。
/// - `instants[i]` 为第 i 对相邻时间点中较晚的一个。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsFrame {
    pub kind: ReturnKind,
    pub instruments: Vec<Instrument>,
    pub instants: Vec<DateTime<Utc>>,
    pub columns: Vec<Vec<f64>>,
}

impl ReturnsFrame {
    /// 创建与给定标的列对应的零行收益率表。
    pub fn empty(kind: ReturnKind, instruments: Vec<Instrument>) -> Self {
        let columns = vec![Vec::new(); instruments.len()];
        Self {
            kind,
            instruments,
            instants: Vec::new(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        column_of(&self.instruments, &self.columns, symbol)
    }
}

fn column_of<'a>(
    instruments: &[Instrument],
    columns: &'a [Vec<f64>],
    symbol: &str,
) -> Option<&'a [f64]> {
    instruments
        .iter()
        .position(|i| i.symbol == symbol)
        .and_then(|idx| columns.get(idx))
        .map(Vec::as_slice)
}

/// # Summary
/// 单列收益率的描述统计。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    pub instrument: Instrument,
    // 样本数
    pub count: usize,
    pub mean: f64,
    // 样本标准差 (n-1)，样本数小于 2 时为 None
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// # Summary
/// 相关强度分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    StrongNegative,
    Moderate,
    StrongPositive,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::StrongNegative => write!(f, "strong negative"),
            Classification::Moderate => write!(f, "moderate"),
            Classification::StrongPositive => write!(f, "strong positive"),
        }
    }
}

/// # Summary
/// 相关系数分类阈值。
///
/// # Invariants
/// - `negative <= positive`。
/// - 闭区间 `[negative, positive]` 归为 Moderate。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationThresholds {
    pub negative: f64,
    pub positive: f64,
}

impl CorrelationThresholds {
    /// # Summary
    /// 按阈值对相关系数分类。
    ///
    /// # Logic
    /// 1. `c < negative` 为强负相关。
    /// 2. `c > positive` 为强正相关。
    /// 3. 其余（含边界本身）为中等。
    pub fn classify(&self, coefficient: f64) -> Classification {
        if coefficient < self.negative {
            Classification::StrongNegative
        } else if coefficient > self.positive {
            Classification::StrongPositive
        } else {
            Classification::Moderate
        }
    }
}

impl Default for CorrelationThresholds {
    fn default() -> Self {
        Self {
            negative: -0.3,
            positive: 0.3,
        }
    }
}

/// # Summary
/// 一次分析运行的相关性结论。
///
/// # Invariants
/// - `coefficient` 位于 `[-1, 1]`。
/// - `sample_size` 为参与计算的收益率行数，至少为 2。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub instrument_a: Instrument,
    pub instrument_b: Instrument,
    pub coefficient: f64,
    pub sample_size: usize,
    pub classification: Classification,
}
