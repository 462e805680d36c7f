use tickcorr_core::common::{Instrument, TimeWindow};
use tickcorr_core::market::entity::TickSeries;
use tickcorr_core::market::error::AcquisitionError;
use tickcorr_core::market::port::{TickSession, TickSource};
use tracing::{debug, error, info};

/// # Summary
/// 在单个数据源会话内依次获取全部标的的 tick。
///
/// # Logic
/// 1. 建立会话。
/// 2. 按顺序抓取每个标的；空结果视为 `AcquisitionError::NoData`。
/// 3. 无论成功还是中途失败，返回前都关闭会话。
///
/// # Arguments
/// * `source`: 数据源。
/// * `instruments`: 目标标的，返回结果与之同序。
/// * `window`: 左闭右开时间窗。
///
/// # Returns
/// 成功返回与 `instruments` 同序的 tick 序列，失败原样返回首个错误。
pub async fn acquire(
    source: &dyn TickSource,
    instruments: &[Instrument],
    window: TimeWindow,
) -> Result<Vec<TickSeries>, AcquisitionError> {
    let mut session = source.connect().await?;
    debug!("Tick session opened for window {}", window);

    let result = fetch_all(&mut *session, instruments, window).await;

    session.close().await;
    debug!("Tick session closed");
    result
}

async fn fetch_all(
    session: &mut dyn TickSession,
    instruments: &[Instrument],
    window: TimeWindow,
) -> Result<Vec<TickSeries>, AcquisitionError> {
    let mut out = Vec::with_capacity(instruments.len());
    for instrument in instruments {
        let series = session
            .fetch_ticks(instrument, window)
            .await
            .inspect_err(|e| error!("Acquisition failed for {}: {}", instrument, e))?;
        if series.is_empty() {
            return Err(AcquisitionError::NoData {
                symbol: instrument.symbol.clone(),
            });
        }
        info!("{}: {} ticks", instrument, series.len());
        out.push(series);
    }
    Ok(out)
}
