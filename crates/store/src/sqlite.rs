use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::path::PathBuf;
use tickcorr_core::common::{Instrument, TimeWindow};
use tickcorr_core::market::entity::{Tick, TickSeries};
use tickcorr_core::store::error::StoreError;
use tickcorr_core::store::port::TickStore;
use tracing::debug;

/// TickStore 的 SQLite 实现，采用“一库一品种”策略。
///
/// # Summary
/// 为每个标的维护一个独立的 SQLite 数据库文件，以实现物理数据隔离。
///
/// # Invariants
/// * 数据库文件存储在指定的 `base_path` 目录下。
/// * 连接池被缓存以避免频繁的文件打开操作。
/// * 时间以 Unix 微秒整数存储，保证区间查询按数值比较。
pub struct SqliteTickStore {
    base_path: PathBuf,
    pools: DashMap<String, SqlitePool>,
}

impl SqliteTickStore {
    /// 创建新的 SqliteTickStore 实例。
    ///
    /// # Logic
    /// 1. 使用 `base_path` 下的 `ticks` 子目录。
    /// 2. 确保该目录存在。
    ///
    /// # Arguments
    /// * `base_path` - 数据根目录。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或错误。
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into().join("ticks");
        if !base_path.exists() {
            std::fs::create_dir_all(&base_path)?;
        }
        Ok(Self {
            base_path,
            pools: DashMap::new(),
        })
    }

    /// 获取或初始化特定标的的连接池。
    ///
    /// # Logic
    /// 1. 根据品种代码和交易场所生成文件名。
    /// 2. 配置 SQLite 连接选项，开启 `create_if_missing`。
    /// 3. 如果缓存中没有，则创建新连接池并运行初始化建表 SQL。
    async fn get_or_init_pool(&self, instrument: &Instrument) -> Result<SqlitePool, StoreError> {
        let venue = instrument.venue.as_deref().unwrap_or("UNKNOWN");
        let key = format!("{}_{}", instrument.symbol, venue);

        if let Some(pool) = self.pools.get(&key) {
            return Ok(pool.clone());
        }

        let db_path = self.base_path.join(format!("{}.db", key));

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ticks (
                time_us INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                price REAL NOT NULL,
                label TEXT NOT NULL,
                PRIMARY KEY (time_us, seq)
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        self.pools.insert(key, pool.clone());
        Ok(pool)
    }
}

#[async_trait]
impl TickStore for SqliteTickStore {
    /// # Summary
    /// 批量保存 tick 序列。
    ///
    /// # Logic
    /// 1. 获取标的连接池并开启事务。
    /// 2. `seq` 为同一微秒时间戳内的到达序号，行键 `(time_us, seq)` 只取决于 tick 本身，
    ///    执行 `INSERT OR REPLACE`。同一时刻的 tick 总是整体落入或落出时间窗，
    ///    因此重复保存或保存相互重叠的时间窗都不会产生重复行。
    /// 3. 提交事务。
    ///
    /// # Arguments
    /// * `series` - 待保存的序列。
    /// * `label` - 会话标签。
    ///
    /// # Returns
    /// * `Result<(), StoreError>`
    async fn save_ticks(&self, series: &TickSeries, label: &str) -> Result<(), StoreError> {
        let pool = self.get_or_init_pool(series.instrument()).await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut prev_us: Option<i64> = None;
        let mut seq: i64 = 0;
        for tick in series.ticks() {
            let time_us = tick.timestamp.timestamp_micros();
            seq = if prev_us == Some(time_us) { seq + 1 } else { 0 };
            prev_us = Some(time_us);

            sqlx::query(
                r#"
                INSERT OR REPLACE INTO ticks (time_us, seq, price, label)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(time_us)
            .bind(seq)
            .bind(tick.price)
            .bind(label)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        debug!("Saved {} ticks of {} to sqlite", series.len(), series.symbol());
        Ok(())
    }

    /// # Summary
    /// 加载时间窗内的 tick。
    ///
    /// # Logic
    /// 1. 获取标的连接池。
    /// 2. 按 `[from, to)` 查询并以 `(time_us, seq)` 排序。
    async fn load_ticks(
        &self,
        instrument: &Instrument,
        window: TimeWindow,
    ) -> Result<TickSeries, StoreError> {
        let pool = self.get_or_init_pool(instrument).await?;

        let records = sqlx::query_as::<_, (i64, f64)>(
            r#"
            SELECT time_us, price
            FROM ticks
            WHERE time_us >= ? AND time_us < ?
            ORDER BY time_us ASC, seq ASC
            "#,
        )
        .bind(window.from.timestamp_micros())
        .bind(window.to.timestamp_micros())
        .fetch_all(&pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let ticks = records
            .into_iter()
            .map(|(micros, price)| {
                DateTime::<Utc>::from_timestamp_micros(micros)
                    .map(|ts| Tick::new(ts, price))
                    .ok_or_else(|| StoreError::Parse(format!("Bad timestamp {}", micros)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        TickSeries::new(instrument.clone(), ticks).map_err(|e| StoreError::Parse(e.to_string()))
    }
}
