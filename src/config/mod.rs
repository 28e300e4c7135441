// ==========================================
// 配棉计算引擎 - 配置层
// ==========================================
// 职责: 引擎配置管理,缺失项使用代码缺省值
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod engine_config;
pub mod error;

// 重导出核心配置管理器
pub use config_manager::{config_keys, get_default_db_path, ConfigManager};
pub use config_reader::EngineConfigReader;
pub use engine_config::EngineConfig;
pub use error::{ConfigError, ConfigResult};
