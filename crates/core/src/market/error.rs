use thiserror::Error;

/// # Summary
/// 行情获取域错误枚举，处理连接、网络、解析及数据缺失等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 分析核心对此类错误不做重试，原样向上传递。
#[derive(Error, Debug)]
pub enum AcquisitionError {
    // 建立数据源会话失败
    #[error("Connection error: {0}")]
    Connection(String),
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 数据解析错误，如 JSON 或 CSV 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
    // 指定标的在时间窗内没有任何 tick
    #[error("No ticks for {symbol}")]
    NoData { symbol: String },
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}
