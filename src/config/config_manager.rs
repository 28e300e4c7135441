// ==========================================
// 配棉计算引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::config_reader::EngineConfigReader;
use crate::config::engine_config::EngineConfig;
use crate::config::error::{ConfigError, ConfigResult};
use crate::db::{configure_sqlite_connection, init_config_schema, open_sqlite_connection};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// 配置库路径环境变量
pub const CONFIG_DB_PATH_ENV: &str = "COTTON_BLEND_DB_PATH";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（config_kv 表不存在时自动创建）
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 创建内存配置库（无配置文件时使用,全部取缺省值）
    pub fn in_memory() -> ConfigResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_sqlite_connection(&conn)?;
        init_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析配置值,格式错误时使用默认值并记录告警
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 校验后写入配置值
    ///
    /// 先用新值构造候选配置并校验,不通过时不写库
    ///
    /// # 返回
    /// - Ok(EngineConfig): 写入后的有效配置
    /// - Err(ConfigError::InvalidValue): 未知配置键、格式错误或取值越界
    pub fn update_config_value(&self, key: &str, value: &str) -> ConfigResult<EngineConfig> {
        let candidate = self.read_engine_config()?.with_value(key, value)?;
        if let Err(e) = candidate.validate() {
            tracing::warn!(config_key = key, value = value, error = %e, "配置值无效，未写入");
            return Err(e);
        }

        self.set_config_value(key, value.trim())?;
        Ok(candidate)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 随汇总报表一起归档,保证历史报表可复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的global配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            if key.starts_with("__meta_") {
                continue;
            }
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// EngineConfigReader Trait 实现
// ==========================================
impl EngineConfigReader for ConfigManager {
    fn get_default_bale_weight(&self) -> ConfigResult<f64> {
        let default = EngineConfig::default().default_bale_weight;
        self.get_parsed_or_default(config_keys::DEFAULT_BALE_WEIGHT, default)
    }

    fn get_percentage_tolerance(&self) -> ConfigResult<f64> {
        let default = EngineConfig::default().percentage_tolerance;
        self.get_parsed_or_default(config_keys::PERCENTAGE_TOLERANCE, default)
    }

    fn get_import_group_keyword(&self) -> ConfigResult<String> {
        let default = EngineConfig::default().import_group_keyword;
        self.get_config_or_default(config_keys::IMPORT_GROUP_KEYWORD, &default)
    }

    fn get_fallback_group_name(&self) -> ConfigResult<String> {
        let default = EngineConfig::default().fallback_group_name;
        self.get_config_or_default(config_keys::FALLBACK_GROUP_NAME, &default)
    }

    fn get_rounding_decimals(&self) -> ConfigResult<u32> {
        let default = EngineConfig::default().rounding_decimals;
        self.get_parsed_or_default(config_keys::ROUNDING_DECIMALS, default)
    }

    fn get_grand_total_label(&self) -> ConfigResult<Option<String>> {
        Ok(self
            .get_config_value(config_keys::GRAND_TOTAL_LABEL)?
            .filter(|v| !v.trim().is_empty()))
    }

    fn get_locale(&self) -> ConfigResult<String> {
        let default = EngineConfig::default().locale;
        self.get_config_or_default(config_keys::LOCALE, &default)
    }
}

/// 获取默认配置库路径
///
/// # 返回
/// - 环境变量 COTTON_BLEND_DB_PATH 指定的路径
/// - 否则: 用户数据目录/cotton-blend/cotton_blend.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(CONFIG_DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./cotton_blend.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("cotton-blend");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("cotton_blend.db");
        }
    }

    path.to_string_lossy().to_string()
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 包重
    pub const DEFAULT_BALE_WEIGHT: &str = "default_bale_weight";

    // 校验
    pub const PERCENTAGE_TOLERANCE: &str = "percentage_tolerance";

    // 汇总报表
    pub const IMPORT_GROUP_KEYWORD: &str = "import_group_keyword";
    pub const FALLBACK_GROUP_NAME: &str = "fallback_group_name";
    pub const GRAND_TOTAL_LABEL: &str = "grand_total_label";

    // 保存载荷
    pub const ROUNDING_DECIMALS: &str = "rounding_decimals";

    // 提示语言
    pub const LOCALE: &str = "locale";
}
