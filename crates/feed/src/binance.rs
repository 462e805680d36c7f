use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tickcorr_core::common::{Instrument, TimeWindow};
use tickcorr_core::market::entity::{Tick, TickSeries};
use tickcorr_core::market::error::AcquisitionError;
use tickcorr_core::market::port::{TickSession, TickSource};
use tracing::{debug, info};

// 单次请求的最大成交数
const PAGE_LIMIT: usize = 1000;
// 同时指定 startTime 与 endTime 时，区间必须小于 1 小时
const CHUNK_MILLIS: i64 = 3_600_000;

/// # Summary
/// Binance 现货逐笔（聚合成交）数据源实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - tick 价格取聚合成交价 `p`，时间取成交时间 `T`（毫秒）。
#[derive(Clone)]
pub struct BinanceTickSource {
    // 内部使用的 HTTP 客户端
    client: Client,
    // REST 根地址，例如 https://api.binance.com
    base_url: String,
}

impl BinanceTickSource {
    /// # Summary
    /// 创建一个新的 BinanceTickSource 实例。
    ///
    /// # Logic
    /// 1. 按配置设置请求超时。
    /// 2. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `base_url`: REST 根地址。
    /// * `timeout`: 单次请求超时。
    ///
    /// # Returns
    /// 成功返回数据源，客户端构建失败返回 `AcquisitionError::Connection`。
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AcquisitionError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TickSource for BinanceTickSource {
    /// # Summary
    /// 探测 REST 接口可达后返回会话。
    async fn connect(&self) -> Result<Box<dyn TickSession>, AcquisitionError> {
        let url = format!("{}/api/v3/ping", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AcquisitionError::Connection(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(AcquisitionError::Connection(format!("HTTP {}", resp.status())));
        }
        info!("Binance connected: {}", self.base_url);
        Ok(Box::new(BinanceSession {
            source: self.clone(),
        }))
    }
}

/// # Summary
/// Binance API 聚合成交记录。
#[derive(Deserialize, Debug)]
struct AggTrade {
    // 聚合成交 ID，用于翻页
    #[serde(rename = "a")]
    id: u64,
    // 成交价（字符串形式的十进制数）
    #[serde(rename = "p")]
    price: String,
    // 成交时间（毫秒）
    #[serde(rename = "T")]
    time: i64,
}

/// # Summary
/// Binance API 错误响应。
#[derive(Deserialize, Debug)]
struct BinanceError {
    msg: String,
}

/// 一页成交的处理结果
#[derive(Debug, Default)]
struct Page {
    ticks: Vec<Tick>,
    // 已越过当前分段终点
    past_end: bool,
    // 下一页的起始 ID；None 表示本段已取完
    next_id: Option<u64>,
}

/// # Summary
/// 将一页原始成交转换为窗口内的 tick。
///
/// # Logic
/// 1. 逐条解析价格与时间，丢弃早于 `start_ms` 的成交。
/// 2. 遇到不早于 `end_ms` 的成交即标记越界并停止。
/// 3. 页满且未越界时给出下一页起始 ID。
fn collect_page(
    trades: Vec<AggTrade>,
    start_ms: i64,
    end_ms: i64,
) -> Result<Page, AcquisitionError> {
    let full = trades.len() >= PAGE_LIMIT;
    let last_id = trades.last().map(|t| t.id);
    let mut page = Page::default();

    for trade in trades {
        if trade.time >= end_ms {
            page.past_end = true;
            break;
        }
        if trade.time < start_ms {
            continue;
        }
        let price: f64 = trade
            .price
            .parse()
            .map_err(|_| AcquisitionError::Parse(format!("Bad price {:?}", trade.price)))?;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(trade.time)
            .ok_or_else(|| AcquisitionError::Parse(format!("Bad trade time {}", trade.time)))?;
        page.ticks.push(Tick::new(timestamp, price));
    }

    if full && !page.past_end {
        page.next_id = last_id.map(|id| id + 1);
    }
    Ok(page)
}

/// 向上取整到毫秒
fn ceil_millis(ts: DateTime<Utc>) -> i64 {
    let millis = ts.timestamp_millis();
    if ts.timestamp_subsec_micros() % 1000 == 0 {
        millis
    } else {
        millis + 1
    }
}

struct BinanceSession {
    source: BinanceTickSource,
}

impl BinanceSession {
    async fn get_trades(&self, query: &[(&str, String)]) -> Result<Vec<AggTrade>, AcquisitionError> {
        let url = format!("{}/api/v3/aggTrades", self.source.base_url);
        let resp = self
            .source
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| AcquisitionError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<BinanceError>()
                .await
                .map(|e| e.msg)
                .unwrap_or_default();
            return Err(AcquisitionError::Network(format!("HTTP {} {}", status, detail)));
        }

        resp.json()
            .await
            .map_err(|e| AcquisitionError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TickSession for BinanceSession {
    /// # Summary
    /// 抓取单一交易对在时间窗内的全部聚合成交。
    ///
    /// # Logic
    /// 1. 将时间窗切成不超过 1 小时的分段。
    /// 2. 每段先按时间区间请求首页，页满则按 `fromId` 继续翻页，直到越过段终点。
    /// 3. 汇总后按窗口精确过滤并构造 TickSeries。
    async fn fetch_ticks(
        &mut self,
        instrument: &Instrument,
        window: TimeWindow,
    ) -> Result<TickSeries, AcquisitionError> {
        let symbol = instrument.symbol.to_uppercase();
        let limit = PAGE_LIMIT.to_string();
        let to_ms = ceil_millis(window.to);
        let mut ticks = Vec::new();

        let mut chunk_start = window.from.timestamp_millis();
        while chunk_start < to_ms {
            let chunk_end = (chunk_start + CHUNK_MILLIS).min(to_ms);
            let mut query = vec![
                ("symbol", symbol.clone()),
                ("startTime", chunk_start.to_string()),
                ("endTime", (chunk_end - 1).to_string()),
                ("limit", limit.clone()),
            ];

            loop {
                let trades = self.get_trades(&query).await?;
                let page = collect_page(trades, chunk_start, chunk_end)?;
                ticks.extend(page.ticks);
                let Some(next_id) = page.next_id else {
                    break;
                };
                query = vec![
                    ("symbol", symbol.clone()),
                    ("fromId", next_id.to_string()),
                    ("limit", limit.clone()),
                ];
            }

            debug!("{}: fetched up to {} ({} ticks so far)", symbol, chunk_end, ticks.len());
            chunk_start = chunk_end;
        }

        ticks.retain(|t| window.contains(t.timestamp));
        TickSeries::new(instrument.clone(), ticks).map_err(|e| AcquisitionError::Parse(e.to_string()))
    }

    async fn close(self: Box<Self>) {
        debug!("Binance session closed");
    }
}
