use crate::analysis::entity::CorrelationThresholds;
use crate::common::time::TimeProvider;
use crate::common::{Instrument, ResampleStep, TimeWindow};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// # Summary
/// 配置校验错误。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid resample step: {0}")]
    Step(String),
    #[error("Invalid instrument: {0:?}")]
    Instrument(String),
    #[error("Invalid window: from {from} is not before to {to}")]
    Window {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    #[error("Invalid thresholds: negative {negative} must not exceed positive {positive}")]
    Thresholds { negative: f64, positive: f64 },
    #[error("Feed 'store' requires a storage backend, got 'none'")]
    StoreFeedWithoutStorage,
}

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub window: WindowConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// 校验所有需要跨字段约束的配置项。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        if self.feed.kind == FeedKind::Store && self.storage.backend == StorageBackend::None {
            return Err(ConfigError::StoreFeedWithoutStorage);
        }
        Ok(())
    }
}

/// # Summary
/// 分析流水线配置，显式传入每个阶段。
///
/// # Invariants
/// - 相关性步骤要求 `instruments` 恰好两个，由流水线在运行时校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // 参与分析的标的，列顺序以此为准
    pub instruments: Vec<Instrument>,
    // 重采样步长
    pub step: ResampleStep,
    // 分类阈值
    pub thresholds: CorrelationThresholds,
    // 连续前向填充超过该桶数时告警；None 表示不告警
    pub max_fill_steps: Option<usize>,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let CorrelationThresholds { negative, positive } = self.thresholds;
        if !negative.is_finite() || !positive.is_finite() || negative > positive {
            return Err(ConfigError::Thresholds { negative, positive });
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            instruments: vec![Instrument::new("EURUSD"), Instrument::new("USDJPY")],
            step: ResampleStep::default(),
            thresholds: CorrelationThresholds::default(),
            max_fill_steps: None,
        }
    }
}

/// # Summary
/// 分析时间窗配置，未给出的边界在运行时由时钟补全。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl WindowConfig {
    /// # Summary
    /// 解析出最终的分析时间窗。
    ///
    /// # Logic
    /// 1. `to` 缺省时取时钟当前时间。
    /// 2. `from` 缺省时取 `to` 所在 UTC 自然日的零点。
    /// 3. 校验 `from < to`。
    ///
    /// # Arguments
    /// * `clock`: 时间供给器。
    ///
    /// # Returns
    /// 成功返回时间窗，区间为空返回 `ConfigError::Window`。
    pub fn resolve(&self, clock: &dyn TimeProvider) -> Result<TimeWindow, ConfigError> {
        let to = self.to.unwrap_or_else(|| clock.now());
        let from = self
            .from
            .unwrap_or_else(|| to.date_naive().and_time(NaiveTime::MIN).and_utc());
        TimeWindow::new(from, to)
    }
}

/// 行情数据源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    // 通过 REST 接口抓取 Binance 逐笔成交
    Binance,
    // 回放本地存储中已落盘的 tick
    Store,
}

/// # Summary
/// 行情数据源配置。
///
/// # Invariants
/// - 默认回放本地存储：默认标的 EURUSD/USDJPY 为外汇品种，Binance 现货不提供。
///   外汇 tick 以 `{data_dir}/ticks_{SYMBOL}_{YYYY-MM-DD}.csv` 放置，表头 `time,price`
///   或终端导出的 `time,bid`。
/// - 切换为 `binance` 时需同时把标的改为 Binance 交易对，例如 `BTCUSDT`、`ETHUSDT`。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub kind: FeedKind,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            kind: FeedKind::Store,
            base_url: "https://api.binance.com".to_string(),
            timeout_secs: 10,
        }
    }
}

/// 原始 tick 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Csv,
    Sqlite,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Csv,
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    // JSON 报告输出路径；None 表示只输出日志摘要
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // EnvFilter 语法，RUST_LOG 优先
    pub filter: String,
    // 滚动日志目录；None 表示只输出到终端
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::FakeClockProvider;
    use chrono::TimeZone;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.instruments.len(), 2);
        assert_eq!(config.analysis.instruments[0].symbol, "EURUSD");
        assert_eq!(config.analysis.instruments[1].symbol, "USDJPY");
        assert_eq!(config.analysis.step.to_string(), "1s");
        assert_eq!(config.analysis.thresholds.negative, -0.3);
        assert_eq!(config.analysis.thresholds.positive, 0.3);
        assert_eq!(config.feed.kind, FeedKind::Store);
        assert_eq!(config.storage.backend, StorageBackend::Csv);
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.log.filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "analysis": { "instruments": ["BTCUSDT@BINANCE", "ETHUSDT"], "step": "250ms" },
            "window": { "from": "2025-06-24T00:00:00Z", "to": "2025-06-24T12:00:00Z" },
            "storage": { "backend": "sqlite" }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.analysis.instruments[0].venue.as_deref(), Some("BINANCE"));
        assert_eq!(config.analysis.step.as_micros(), 250_000);
        assert_eq!(config.analysis.thresholds, CorrelationThresholds::default());
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.data_dir, "data");

        let bad = r#"{ "analysis": { "step": "0s" } }"#;
        assert!(serde_json::from_str::<AppConfig>(bad).is_err());
    }

    #[test]
    fn test_feed_and_storage_pairing() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::None;
        assert_eq!(config.validate(), Err(ConfigError::StoreFeedWithoutStorage));

        // 网络数据源不依赖存储
        config.feed.kind = FeedKind::Binance;
        config.analysis.instruments = vec![Instrument::new("BTCUSDT"), Instrument::new("ETHUSDT")];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_thresholds() {
        let mut config = AnalysisConfig::default();
        config.thresholds = CorrelationThresholds {
            negative: 0.5,
            positive: 0.1,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Thresholds { .. })
        ));
    }

    #[test]
    fn test_window_resolve_defaults_to_current_day() {
        let now = Utc.with_ymd_and_hms(2025, 6, 24, 15, 0, 0).unwrap();
        let clock = FakeClockProvider::new(now);

        let window = WindowConfig::default().resolve(&clock).unwrap();
        assert_eq!(window.from, Utc.with_ymd_and_hms(2025, 6, 24, 0, 0, 0).unwrap());
        assert_eq!(window.to, now);

        let explicit = WindowConfig {
            from: Some(Utc.with_ymd_and_hms(2025, 6, 23, 8, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 6, 23, 9, 0, 0).unwrap()),
        };
        let window = explicit.resolve(&clock).unwrap();
        assert_eq!(window.label(), "2025-06-23");

        let reversed = WindowConfig {
            from: Some(now),
            to: Some(now),
        };
        assert!(reversed.resolve(&clock).is_err());
    }
}
