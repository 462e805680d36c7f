use async_trait::async_trait;
use std::sync::Arc;
use tickcorr_core::common::{Instrument, TimeWindow};
use tickcorr_core::market::entity::TickSeries;
use tickcorr_core::market::error::AcquisitionError;
use tickcorr_core::market::port::{TickSession, TickSource};
use tickcorr_core::store::error::StoreError;
use tickcorr_core::store::port::TickStore;

/// # Summary
/// 把已落盘的 tick 当作数据源回放，用于离线复现分析。
pub struct StoreTickSource {
    store: Arc<dyn TickStore>,
}

impl StoreTickSource {
    pub fn new(store: Arc<dyn TickStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TickSource for StoreTickSource {
    async fn connect(&self) -> Result<Box<dyn TickSession>, AcquisitionError> {
        Ok(Box::new(StoreSession {
            store: self.store.clone(),
        }))
    }
}

struct StoreSession {
    store: Arc<dyn TickStore>,
}

#[async_trait]
impl TickSession for StoreSession {
    async fn fetch_ticks(
        &mut self,
        instrument: &Instrument,
        window: TimeWindow,
    ) -> Result<TickSeries, AcquisitionError> {
        self.store
            .load_ticks(instrument, window)
            .await
            .map_err(|e| match e {
                StoreError::Parse(msg) => AcquisitionError::Parse(msg),
                StoreError::NotFound(_) => AcquisitionError::NoData {
                    symbol: instrument.symbol.clone(),
                },
                other => AcquisitionError::Unknown(other.to_string()),
            })
    }

    async fn close(self: Box<Self>) {}
}
