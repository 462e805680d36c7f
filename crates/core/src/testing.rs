use crate::common::{Instrument, TimeWindow};
use crate::market::entity::{Tick, TickSeries};
use crate::market::error::AcquisitionError;
use crate::market::port::{TickSession, TickSource};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// # Summary
/// 内存版 tick 数据源，供各 crate 的测试注入预设数据。
///
/// # Invariants
/// - 记录会话的打开与关闭次数，用于验证资源释放。
#[derive(Default, Clone)]
pub struct MockTickSource {
    ticks: Arc<DashMap<String, Vec<Tick>>>,
    failing: Arc<DashMap<String, String>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MockTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预设某个标的的 tick。
    pub fn insert(&self, symbol: &str, ticks: Vec<Tick>) {
        self.ticks.insert(symbol.to_string(), ticks);
    }

    /// 让某个标的的抓取返回网络错误。
    pub fn fail(&self, symbol: &str, reason: &str) {
        self.failing.insert(symbol.to_string(), reason.to_string());
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TickSource for MockTickSource {
    async fn connect(&self) -> Result<Box<dyn TickSession>, AcquisitionError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockTickSession {
            source: self.clone(),
        }))
    }
}

struct MockTickSession {
    source: MockTickSource,
}

#[async_trait]
impl TickSession for MockTickSession {
    async fn fetch_ticks(
        &mut self,
        instrument: &Instrument,
        window: TimeWindow,
    ) -> Result<TickSeries, AcquisitionError> {
        if let Some(reason) = self.source.failing.get(&instrument.symbol) {
            return Err(AcquisitionError::Network(reason.clone()));
        }
        let ticks = self
            .source
            .ticks
            .get(&instrument.symbol)
            .map(|v| v.clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|t| window.contains(t.timestamp))
            .collect();
        TickSeries::new(instrument.clone(), ticks)
            .map_err(|e| AcquisitionError::Parse(e.to_string()))
    }

    async fn close(self: Box<Self>) {
        self.source.closed.fetch_add(1, Ordering::SeqCst);
    }
}
