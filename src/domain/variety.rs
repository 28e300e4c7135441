// ==========================================
// 配棉计算引擎 - 棉花品种领域模型
// ==========================================
// 职责: 定义品种目录 (Variety) 及平均包重回退规则
// 红线: 引擎只读品种目录,不做增删改
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 平均包重缺省值 (kg/包)
///
/// 品种未设置包重或包重非正时使用
pub const DEFAULT_AVG_BALE_WEIGHT: f64 = 170.0;

// ==========================================
// Variety - 棉花品种
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variety {
    pub id: String,                    // 品种ID
    pub group: String,                 // 品种分组 (如 "Imported" / "S-6")
    pub variety_name: String,          // 品种名称 (配棉表中的唯一标识)
    #[serde(default)]
    pub avg_bale_weight: Option<f64>,  // 平均包重 (kg/包)
}

impl Variety {
    /// 创建新品种,自动分配ID
    pub fn new(variety_name: &str, group: &str, avg_bale_weight: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            group: group.to_string(),
            variety_name: variety_name.to_string(),
            avg_bale_weight,
        }
    }

    /// 有效平均包重
    ///
    /// 未设置、非正数或非有限值时回退到 `default_weight`
    pub fn effective_bale_weight(&self, default_weight: f64) -> f64 {
        match self.avg_bale_weight {
            Some(w) if w.is_finite() && w > 0.0 => w,
            _ => default_weight,
        }
    }

    /// 是否使用了缺省包重
    pub fn uses_fallback_weight(&self) -> bool {
        !matches!(self.avg_bale_weight, Some(w) if w.is_finite() && w > 0.0)
    }
}

// ==========================================
// VarietyCatalog - 品种目录索引
// ==========================================
// 按品种名称建立索引,供分配/汇总引擎查询
#[derive(Debug, Clone, Default)]
pub struct VarietyCatalog {
    by_name: HashMap<String, Variety>,
}

impl VarietyCatalog {
    /// 从品种列表建立索引
    ///
    /// 名称重复时保留最后一条 (目录维护方保证唯一)
    pub fn new(varieties: &[Variety]) -> Self {
        let by_name = varieties
            .iter()
            .map(|v| (v.variety_name.clone(), v.clone()))
            .collect();
        Self { by_name }
    }

    pub fn get(&self, variety_name: &str) -> Option<&Variety> {
        self.by_name.get(variety_name)
    }

    /// 查询品种分组,目录中不存在时返回 None
    pub fn group_of(&self, variety_name: &str) -> Option<&str> {
        self.by_name.get(variety_name).map(|v| v.group.as_str())
    }
}
