use std::path::Path;
use tickcorr_core::config::AppConfig;

// 未指定路径时尝试读取的默认配置文件（不含扩展名）
const DEFAULT_FILE: &str = "tickcorr";
const ENV_PREFIX: &str = "TICKCORR";

/// # Summary
/// 按优先级合并配置来源并反序列化为 `AppConfig`。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 作为最底层。
/// 2. 叠加配置文件：给出路径时必须存在，否则尝试可选的 `tickcorr.toml`。
/// 3. 叠加 `TICKCORR_` 前缀的环境变量，层级用双下划线分隔，
///    例如 `TICKCORR_FEED__BASE_URL`。
///
/// # Arguments
/// * `path`: 命令行给出的配置文件路径。
///
/// # Returns
/// 合并后的配置，尚未做跨字段校验。
pub fn load(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path)
            .format(config::FileFormat::Toml)
            .required(true),
        None => config::File::with_name(DEFAULT_FILE)
            .format(config::FileFormat::Toml)
            .required(false),
    };

    config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?)
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}
