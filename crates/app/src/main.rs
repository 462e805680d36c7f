mod report;
mod settings;

use report::AnalysisReport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tickcorr_analysis::pipeline::Pipeline;
use tickcorr_analysis::session::acquire;
use tickcorr_core::common::time::RealTimeProvider;
use tickcorr_core::config::{ConfigError, FeedKind, LogConfig, StorageBackend, StorageConfig};
use tickcorr_core::market::port::TickSource;
use tickcorr_core::store::error::StoreError;
use tickcorr_core::store::port::TickStore;
use tickcorr_feed::binance::BinanceTickSource;
use tickcorr_store::csv::CsvTickStore;
use tickcorr_store::replay::StoreTickSource;
use tickcorr_store::sqlite::SqliteTickStore;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// # Summary
/// 初始化全局日志：终端输出，配置了目录时额外按天滚动写文件。
///
/// # Returns
/// 文件日志的后台写线程守卫，必须持有到进程退出。
fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    // RUST_LOG 优先于配置文件
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tickcorr.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    guard
}

/// 按配置打开原始 tick 存储；`none` 返回 None。
fn open_store(config: &StorageConfig) -> Result<Option<Arc<dyn TickStore>>, StoreError> {
    let store: Arc<dyn TickStore> = match config.backend {
        StorageBackend::Csv => Arc::new(CsvTickStore::new(&config.data_dir)?),
        StorageBackend::Sqlite => Arc::new(SqliteTickStore::new(&config.data_dir)?),
        StorageBackend::None => return Ok(None),
    };
    Ok(Some(store))
}

/// # Summary
/// 应用启动入口：一次性批处理分析。
///
/// # Logic
/// 1. 加载并校验配置，初始化日志。
/// 2. 解析分析时间窗，构造数据源与存储。
/// 3. 在单个会话内获取全部标的的 tick。
/// 4. 数据来自网络时落盘原始 tick。
/// 5. 运行分析流水线，输出日志摘要与可选的 JSON 报告。
///
/// 任一阶段失败都会记录阶段名后退出，不写出部分报告。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    // 1. 配置与日志
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = settings::load(config_path.as_deref())?;
    let _guard = init_logging(&config.log);
    config
        .validate()
        .inspect_err(|e| error!("Configuration rejected: {}", e))?;
    info!("Tickcorr starting...");

    // 2. 时间窗、存储与数据源
    let window = config
        .window
        .resolve(&RealTimeProvider)
        .inspect_err(|e| error!("Configuration rejected: {}", e))?;
    let store = open_store(&config.storage)
        .inspect_err(|e| error!("Storage unavailable: {}", e))?;
    let source: Box<dyn TickSource> = match config.feed.kind {
        FeedKind::Binance => Box::new(BinanceTickSource::new(
            config.feed.base_url.clone(),
            Duration::from_secs(config.feed.timeout_secs),
        )?),
        FeedKind::Store => {
            // validate() 已排除 store 数据源配合 none 存储的组合
            let Some(store) = store.clone() else {
                return Err(ConfigError::StoreFeedWithoutStorage.into());
            };
            Box::new(StoreTickSource::new(store))
        }
    };
    info!(
        "Analyzing {:?} over {} at step {}",
        config
            .analysis
            .instruments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        window,
        config.analysis.step
    );

    // 3. 获取
    let series = acquire(source.as_ref(), &config.analysis.instruments, window)
        .await
        .inspect_err(|e| error!("Stage acquisition failed: {}", e))?;

    // 4. 落盘
    if let Some(store) = store.as_ref().filter(|_| config.feed.kind != FeedKind::Store) {
        let label = window.label();
        for ticks in &series {
            store.save_ticks(ticks, &label).await.inspect_err(|e| {
                error!("Stage persistence failed for {}: {}", ticks.instrument(), e)
            })?;
        }
    }

    // 5. 分析与报告
    let step = config.analysis.step;
    let pipeline = Pipeline::new(config.analysis);
    let analysis = pipeline
        .run(&series)
        .inspect_err(|e| error!("Stage analysis failed: {}", e))?;

    let report = AnalysisReport::new(window, step, analysis);
    report.log_summary();
    if let Some(output) = &config.report.output {
        report
            .write_json(Path::new(output))
            .inspect_err(|e| error!("Stage report failed: {}", e))?;
    }

    info!("Tickcorr finished.");
    Ok(())
}
