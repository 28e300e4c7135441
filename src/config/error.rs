// ==========================================
// 配棉计算引擎 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error("配置快照解析失败: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("配置值无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
