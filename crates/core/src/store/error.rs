use thiserror::Error;

/// # Summary
/// 存储层错误枚举，处理数据库、文件读写与解析失败等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据库操作失败
    #[error("Database error: {0}")]
    Database(String),
    /// 文件系统读写失败
    #[error("IO error: {0}")]
    Io(String),
    /// 已存储数据无法解析
    #[error("Parse error: {0}")]
    Parse(String),
    /// 记录未找到
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}
