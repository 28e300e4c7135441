use crate::config::error::{ConfigError, ConfigResult};
use crate::config::config_manager::config_keys;
use crate::domain::variety::DEFAULT_AVG_BALE_WEIGHT;
use crate::engine::aggregator::{DEFAULT_FALLBACK_GROUP, DEFAULT_IMPORT_KEYWORD};
use crate::engine::finalizer::DEFAULT_ROUNDING_DECIMALS;
use crate::engine::validator::DEFAULT_PERCENTAGE_TOLERANCE;
use serde::{Deserialize, Serialize};

/// 缺省界面语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 配棉引擎配置
///
/// 存储位置：config_kv（scope_id='global'），每个字段一个 key，见 [`config_keys`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 品种未设置包重时的缺省平均包重
    pub default_bale_weight: f64,

    /// 百分比之和允许误差
    pub percentage_tolerance: f64,

    /// 进口分组关键字（忽略大小写的子串匹配）
    pub import_group_keyword: String,

    /// 目录缺失品种归入的分组
    pub fallback_group_name: String,

    /// 保存载荷保留小数位
    pub rounding_decimals: u32,

    /// 汇总报表总计行标签（None 时按 locale 取 report.grand_total）
    #[serde(default)]
    pub grand_total_label: Option<String>,

    /// 用户提示语言（zh-CN / en）
    pub locale: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_bale_weight: DEFAULT_AVG_BALE_WEIGHT,
            percentage_tolerance: DEFAULT_PERCENTAGE_TOLERANCE,
            import_group_keyword: DEFAULT_IMPORT_KEYWORD.to_string(),
            fallback_group_name: DEFAULT_FALLBACK_GROUP.to_string(),
            rounding_decimals: DEFAULT_ROUNDING_DECIMALS,
            grand_total_label: None,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl EngineConfig {
    /// 实际使用的总计行标签
    pub fn effective_grand_total_label(&self) -> String {
        match &self.grand_total_label {
            Some(label) => label.clone(),
            None => crate::i18n::t_in_locale(&self.locale, "report.grand_total", &[]),
        }
    }

    /// 按配置键覆写单个字段,返回新配置（不校验取值范围）
    ///
    /// # 返回
    /// - Err(ConfigError::InvalidValue): 未知配置键或取值格式错误
    pub fn with_value(&self, key: &str, raw: &str) -> ConfigResult<Self> {
        let mut config = self.clone();
        let value = raw.trim();

        match key {
            config_keys::DEFAULT_BALE_WEIGHT => {
                config.default_bale_weight = parse_value(key, value)?;
            }
            config_keys::PERCENTAGE_TOLERANCE => {
                config.percentage_tolerance = parse_value(key, value)?;
            }
            config_keys::ROUNDING_DECIMALS => {
                config.rounding_decimals = parse_value(key, value)?;
            }
            config_keys::IMPORT_GROUP_KEYWORD => {
                config.import_group_keyword = value.to_string();
            }
            config_keys::FALLBACK_GROUP_NAME => {
                config.fallback_group_name = value.to_string();
            }
            config_keys::GRAND_TOTAL_LABEL => {
                config.grand_total_label = Some(value.to_string()).filter(|v| !v.is_empty());
            }
            config_keys::LOCALE => {
                config.locale = value.to_string();
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "未知配置项".to_string(),
                });
            }
        }

        Ok(config)
    }

    /// 校验配置取值范围
    ///
    /// # 验证规则
    /// 1. 缺省包重必须为正的有限值
    /// 2. 允许误差在 [0, 1] 之间
    /// 3. 进口关键字不能为空（空串会匹配所有分组）
    /// 4. 小数位不超过 6
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.default_bale_weight.is_finite() || self.default_bale_weight <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::DEFAULT_BALE_WEIGHT.to_string(),
                message: format!("缺省包重 {} 必须为正数", self.default_bale_weight),
            });
        }

        if !self.percentage_tolerance.is_finite()
            || self.percentage_tolerance < 0.0
            || self.percentage_tolerance > 1.0
        {
            return Err(ConfigError::InvalidValue {
                key: config_keys::PERCENTAGE_TOLERANCE.to_string(),
                message: format!("允许误差 {} 超出有效范围 [0, 1]", self.percentage_tolerance),
            });
        }

        if self.import_group_keyword.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: config_keys::IMPORT_GROUP_KEYWORD.to_string(),
                message: "进口分组关键字不能为空".to_string(),
            });
        }

        if self.rounding_decimals > 6 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::ROUNDING_DECIMALS.to_string(),
                message: format!("小数位 {} 超过 6", self.rounding_decimals),
            });
        }

        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("取值 '{}' 格式错误", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_bale_weight, 170.0);
        assert_eq!(config.percentage_tolerance, 0.01);
        assert_eq!(config.import_group_keyword, "import");
        assert_eq!(config.rounding_decimals, 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = EngineConfig {
            default_bale_weight: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            percentage_tolerance: 5.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            import_group_keyword: "  ".to_string(),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_value_overrides_single_field() {
        let base = EngineConfig::default();

        let updated = base
            .with_value(config_keys::DEFAULT_BALE_WEIGHT, " 180 ")
            .unwrap();
        assert_eq!(updated.default_bale_weight, 180.0);
        assert_eq!(updated.percentage_tolerance, base.percentage_tolerance);

        let updated = base.with_value(config_keys::GRAND_TOTAL_LABEL, "").unwrap();
        assert_eq!(updated.grand_total_label, None);

        assert!(base.with_value(config_keys::ROUNDING_DECIMALS, "two").is_err());
        assert!(base.with_value("no_such_key", "1").is_err());
    }

    #[test]
    fn test_grand_total_label_follows_locale() {
        let zh = EngineConfig::default();
        assert_eq!(zh.effective_grand_total_label(), "总计");

        let en = EngineConfig {
            locale: "en".to_string(),
            ..EngineConfig::default()
        };
        assert_eq!(en.effective_grand_total_label(), "Grand Total");

        let custom = EngineConfig {
            grand_total_label: Some("Total".to_string()),
            ..EngineConfig::default()
        };
        assert_eq!(custom.effective_grand_total_label(), "Total");
    }
}
