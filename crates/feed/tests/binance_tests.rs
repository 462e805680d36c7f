use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tickcorr_core::common::{Instrument, TimeWindow};
use tickcorr_core::market::error::AcquisitionError;
use tickcorr_core::market::port::{TickSession, TickSource};
use tickcorr_feed::binance::BinanceTickSource;

fn install_crypto() {
    // 重复安装会返回 Err，多个测试共享进程时忽略即可
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// # Summary
/// 数据源不可达时 connect 返回连接错误，而不是在抓取阶段才失败。
#[tokio::test]
async fn test_connect_unreachable_host() {
    install_crypto();
    let source = BinanceTickSource::new("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();

    let result = source.connect().await;

    assert!(matches!(result, Err(AcquisitionError::Connection(_))));
}

/// # Summary
/// Binance 真实抓取的集成测试（需要外网）。
///
/// # Logic
/// 1. 抓取 BTCUSDT 最近 10 秒的聚合成交。
/// 2. 断言结果在时间窗内且按时间排序。
#[tokio::test]
#[ignore = "requires network access to api.binance.com"]
async fn test_binance_real_fetch() -> anyhow::Result<()> {
    install_crypto();
    let source = BinanceTickSource::new("https://api.binance.com", Duration::from_secs(10))?;
    let to = Utc::now();
    let window = TimeWindow::new(to - ChronoDuration::seconds(10), to)?;

    let mut session = source.connect().await?;
    let series = session
        .fetch_ticks(&Instrument::new("BTCUSDT"), window)
        .await;
    session.close().await;

    let series = series?;
    println!("Fetched {} ticks for BTCUSDT", series.len());
    assert!(series.ticks().iter().all(|t| window.contains(t.timestamp)));
    assert!(series.ticks().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    Ok(())
}
