pub mod time;

use crate::config::ConfigError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 交易标的实体，代表参与相关性分析的一个报价品种。
///
/// # Invariants
/// - `symbol` 非空，是标的的唯一身份。
/// - 文本形式为 `SYMBOL` 或 `SYMBOL@VENUE`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Instrument {
    // 品种代码 (例如: EURUSD, BTCUSDT)
    pub symbol: String,
    // 交易场所 (可选，例如: BINANCE)
    pub venue: Option<String>,
}

impl Instrument {
    /// 以品种代码创建不带交易场所的标的。
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            venue: None,
        }
    }
}

impl FromStr for Instrument {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, venue) = match s.split_once('@') {
            Some((symbol, venue)) => (symbol.trim(), Some(venue.trim())),
            None => (s.trim(), None),
        };
        if symbol.is_empty() || venue.is_some_and(str::is_empty) {
            return Err(ConfigError::Instrument(s.to_string()));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            venue: venue.map(str::to_string),
        })
    }
}

impl TryFrom<String> for Instrument {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Instrument> for String {
    fn from(value: Instrument) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.venue {
            Some(venue) => write!(f, "{}@{}", self.symbol, venue),
            None => write!(f, "{}", self.symbol),
        }
    }
}

/// # Summary
/// 重采样步长，即固定网格上相邻两个时间点的间隔。
///
/// # Invariants
/// - 以微秒计，取值范围 `(0, 1d]`。
/// - 文本形式为 `<整数><单位>`，单位取 `us`, `ms`, `s`, `m`, `h`, `d`。
/// - 桶边界以 Unix 纪元为原点。对能整除一天的步长（如 `1s`, `5m`, `1h`），
///   这与以自然日零点为原点的网格一致；不能整除一天的步长（如 `7s`）
///   在跨日后会与按日对齐的网格错开。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResampleStep {
    micros: i64,
}

const MICROS_PER_DAY: i64 = 86_400_000_000;

const UNITS: [(&str, i64); 6] = [
    ("d", MICROS_PER_DAY),
    ("h", 3_600_000_000),
    ("m", 60_000_000),
    ("s", 1_000_000),
    ("ms", 1_000),
    ("us", 1),
];

impl ResampleStep {
    /// 以微秒数创建步长，非正数或超过一天返回 None。
    pub fn from_micros(micros: i64) -> Option<Self> {
        (micros > 0 && micros <= MICROS_PER_DAY).then_some(Self { micros })
    }

    /// 以秒数创建步长，非正数或溢出返回 None。
    pub fn from_secs(secs: i64) -> Option<Self> {
        secs.checked_mul(1_000_000).and_then(Self::from_micros)
    }

    pub fn as_micros(&self) -> i64 {
        self.micros
    }

    pub fn as_delta(&self) -> TimeDelta {
        TimeDelta::microseconds(self.micros)
    }

    /// # Summary
    /// 将时间戳向下截断到步长边界（以 Unix 纪元为原点）。
    ///
    /// # Arguments
    /// * `ts`: 任意 UTC 时间点。
    ///
    /// # Returns
    /// 该时间点所在桶的起始边界。纪元之前的时间同样向下取整。
    pub fn floor(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let micros = ts.timestamp_micros();
        let bucket = micros.div_euclid(self.micros) * self.micros;
        DateTime::from_timestamp_micros(bucket).unwrap_or(ts)
    }
}

impl Default for ResampleStep {
    fn default() -> Self {
        Self { micros: 1_000_000 }
    }
}

impl FromStr for ResampleStep {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ConfigError::Step(s.clone()))?;
        let (digits, unit) = s.split_at(split);
        let value: i64 = digits.parse().map_err(|_| ConfigError::Step(s.clone()))?;
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| ConfigError::Step(s.clone()))?;
        value
            .checked_mul(scale)
            .and_then(Self::from_micros)
            .ok_or(ConfigError::Step(s))
    }
}

impl TryFrom<String> for ResampleStep {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResampleStep> for String {
    fn from(value: ResampleStep) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for ResampleStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `us` 的倍率为 1，循环必然命中
        for (name, scale) in UNITS {
            if self.micros % scale == 0 {
                return write!(f, "{}{}", self.micros / scale, name);
            }
        }
        write!(f, "{}us", self.micros)
    }
}

/// # Summary
/// 左闭右开的 UTC 分析时间窗 `[from, to)`。
///
/// # Invariants
/// - `from < to`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ConfigError> {
        if from >= to {
            return Err(ConfigError::Window { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts < self.to
    }

    /// 会话标签，用于原始数据文件命名。
    pub fn label(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.from.to_rfc3339(), self.to.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_step_parse_and_display() {
        assert_eq!("1s".parse::<ResampleStep>().unwrap().as_micros(), 1_000_000);
        assert_eq!("250ms".parse::<ResampleStep>().unwrap().as_micros(), 250_000);
        assert_eq!("5m".parse::<ResampleStep>().unwrap().to_string(), "5m");
        assert_eq!("1000ms".parse::<ResampleStep>().unwrap().to_string(), "1s");
        assert_eq!("1500ms".parse::<ResampleStep>().unwrap().to_string(), "1500ms");
        assert!("0s".parse::<ResampleStep>().is_err());
        assert!("s".parse::<ResampleStep>().is_err());
        assert!("10".parse::<ResampleStep>().is_err());
        assert!("3 weeks".parse::<ResampleStep>().is_err());
    }

    #[test]
    fn test_step_upper_bound() {
        assert_eq!("1d".parse::<ResampleStep>().unwrap().to_string(), "1d");
        assert_eq!("24h".parse::<ResampleStep>().unwrap().to_string(), "1d");
        assert!("25h".parse::<ResampleStep>().is_err());
        assert!("106000000d".parse::<ResampleStep>().is_err());
        assert!(ResampleStep::from_micros(86_400_000_001).is_none());
        assert!(ResampleStep::from_secs(i64::MAX).is_none());
    }

    #[test]
    fn test_step_floor() {
        let step = ResampleStep::from_secs(5).unwrap();
        let ts = Utc.timestamp_millis_opt(1_700_000_003_900).unwrap();
        assert_eq!(step.floor(ts), Utc.timestamp_opt(1_700_000_000, 0).unwrap());

        let before_epoch = Utc.timestamp_millis_opt(-1_500).unwrap();
        assert_eq!(step.floor(before_epoch), Utc.timestamp_opt(-5, 0).unwrap());
    }

    #[test]
    fn test_instrument_parse() {
        let plain: Instrument = "EURUSD".parse().unwrap();
        assert_eq!(plain, Instrument::new("EURUSD"));

        let venue: Instrument = "BTCUSDT@BINANCE".parse().unwrap();
        assert_eq!(venue.venue.as_deref(), Some("BINANCE"));
        assert_eq!(venue.to_string(), "BTCUSDT@BINANCE");

        assert!("".parse::<Instrument>().is_err());
        assert!("BTC@".parse::<Instrument>().is_err());
    }

    #[test]
    fn test_window() {
        let from = Utc.with_ymd_and_hms(2025, 6, 24, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 24, 13, 30, 0).unwrap();
        let window = TimeWindow::new(from, now).unwrap();
        assert!(window.contains(window.from));
        assert!(!window.contains(now));
        assert_eq!(window.label(), "2025-06-24");

        assert!(TimeWindow::new(from, from).is_err());
    }
}
