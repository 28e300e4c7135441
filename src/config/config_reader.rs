// ==========================================
// 配棉计算引擎 - 引擎配置读取 Trait
// ==========================================
// 职责: 定义配棉引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::config::error::ConfigResult;

// ==========================================
// EngineConfigReader Trait
// ==========================================
// 用途: API 层组装引擎时读取配置
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait EngineConfigReader: Send + Sync {
    /// 获取缺省平均包重
    ///
    /// # 默认值
    /// - 170.0
    fn get_default_bale_weight(&self) -> ConfigResult<f64>;

    /// 获取百分比之和允许误差
    ///
    /// # 默认值
    /// - 0.01
    fn get_percentage_tolerance(&self) -> ConfigResult<f64>;

    /// 获取进口分组关键字
    ///
    /// # 默认值
    /// - "import"
    fn get_import_group_keyword(&self) -> ConfigResult<String>;

    /// 获取目录缺失品种的兜底分组
    ///
    /// # 默认值
    /// - "Ungrouped"
    fn get_fallback_group_name(&self) -> ConfigResult<String>;

    /// 获取保存载荷小数位
    ///
    /// # 默认值
    /// - 2
    fn get_rounding_decimals(&self) -> ConfigResult<u32>;

    /// 获取总计行标签
    ///
    /// # 默认值
    /// - None（按语言取本地化标签）
    fn get_grand_total_label(&self) -> ConfigResult<Option<String>>;

    /// 获取用户提示语言
    fn get_locale(&self) -> ConfigResult<String>;

    /// 读取完整引擎配置（不校验）
    fn read_engine_config(&self) -> ConfigResult<EngineConfig> {
        Ok(EngineConfig {
            default_bale_weight: self.get_default_bale_weight()?,
            percentage_tolerance: self.get_percentage_tolerance()?,
            import_group_keyword: self.get_import_group_keyword()?,
            fallback_group_name: self.get_fallback_group_name()?,
            rounding_decimals: self.get_rounding_decimals()?,
            grand_total_label: self.get_grand_total_label()?,
            locale: self.get_locale()?,
        })
    }

    /// 读取完整引擎配置并校验
    fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        let config = self.read_engine_config()?;
        config.validate()?;
        Ok(config)
    }
}
