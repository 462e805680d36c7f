use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tickcorr_core::common::{Instrument, TimeWindow};
use tickcorr_core::market::entity::{Tick, TickSeries};
use tickcorr_core::store::error::StoreError;
use tickcorr_core::store::port::TickStore;
use tracing::{debug, info};

/// CSV 文件中的一行
#[derive(Debug, Serialize, Deserialize)]
struct TickRecord {
    time: DateTime<Utc>,
    // 兼容终端导出的 bid 列
    #[serde(alias = "bid")]
    price: f64,
}

/// # Summary
/// 以 CSV 文件保存原始 tick，每个标的每个会话一个文件。
///
/// # Invariants
/// - 文件名为 `ticks_{SYMBOL}_{label}.csv`，位于 `base_path` 下。
/// - 表头为 `time,price`，时间为 RFC 3339。
pub struct CsvTickStore {
    base_path: PathBuf,
}

impl CsvTickStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            std::fs::create_dir_all(&base_path)?;
        }
        Ok(Self { base_path })
    }

    pub fn path_for(&self, instrument: &Instrument, label: &str) -> PathBuf {
        self.base_path
            .join(format!("ticks_{}_{}.csv", instrument.symbol, label))
    }

    /// 列出某个标的的全部 CSV 文件，按文件名排序。
    fn files_for(&self, instrument: &Instrument) -> Result<Vec<PathBuf>, StoreError> {
        let prefix = format!("ticks_{}_", instrument.symbol);
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".csv"));
            if matches {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn write_file(path: &Path, ticks: &[Tick]) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| StoreError::Io(e.to_string()))?;
    for tick in ticks {
        writer
            .serialize(TickRecord {
                time: tick.timestamp,
                price: tick.price,
            })
            .map_err(|e| StoreError::Io(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

// 行键：(时间, 同一时间戳内的到达序号)
type TickKey = (DateTime<Utc>, usize);

/// # Summary
/// 读取单个文件中落在时间窗内的 tick，合并进 `merged`。
///
/// # Logic
/// 1. 为每行计算 `(time, seq)`，`seq` 为该时间戳在本文件内的出现序号。
/// 2. 以该键写入 `merged`，后读的文件覆盖先读的同键行。
fn merge_file(
    path: &Path,
    window: TimeWindow,
    merged: &mut BTreeMap<TickKey, f64>,
) -> Result<(), StoreError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StoreError::Io(e.to_string()))?;
    let mut seen: HashMap<DateTime<Utc>, usize> = HashMap::new();
    for record in reader.deserialize::<TickRecord>() {
        let record =
            record.map_err(|e| StoreError::Parse(format!("{}: {}", path.display(), e)))?;
        if !window.contains(record.time) {
            continue;
        }
        let seq = seen.entry(record.time).or_insert(0);
        merged.insert((record.time, *seq), record.price);
        *seq += 1;
    }
    Ok(())
}

#[async_trait]
impl TickStore for CsvTickStore {
    /// # Summary
    /// 将序列写入对应会话的 CSV 文件，已存在则覆盖。
    async fn save_ticks(&self, series: &TickSeries, label: &str) -> Result<(), StoreError> {
        let path = self.path_for(series.instrument(), label);
        let ticks = series.ticks().to_vec();
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_file(&target, &ticks))
            .await
            .map_err(|e| StoreError::Io(e.to_string()))??;
        info!("{}: {} ticks saved to {}", series.symbol(), series.len(), path.display());
        Ok(())
    }

    /// # Summary
    /// 读取标的全部 CSV 文件中落在时间窗内的 tick。
    ///
    /// # Logic
    /// 1. 按文件名顺序读取 `ticks_{SYMBOL}_*.csv`，过滤窗口外的行。
    /// 2. 以 `(time, seq)` 去重：多个会话文件相互重叠时（例如跨零点的时间窗）
    ///    同一笔 tick 只保留一次，文件名靠后者优先，与 SQLite 存储的覆盖写一致。
    /// 3. 没有任何文件时返回空序列。
    async fn load_ticks(
        &self,
        instrument: &Instrument,
        window: TimeWindow,
    ) -> Result<TickSeries, StoreError> {
        let files = self.files_for(instrument)?;
        debug!("{}: reading {} csv files", instrument, files.len());

        let merged = tokio::task::spawn_blocking(move || {
            let mut merged = BTreeMap::new();
            for path in &files {
                merge_file(path, window, &mut merged)?;
            }
            Ok::<_, StoreError>(merged)
        })
        .await
        .map_err(|e| StoreError::Io(e.to_string()))??;

        let ticks = merged
            .into_iter()
            .map(|((time, _), price)| Tick::new(time, price))
            .collect();

        TickSeries::new(instrument.clone(), ticks).map_err(|e| StoreError::Parse(e.to_string()))
    }
}
