// ==========================================
// 配棉计算引擎 - 车间配棉计划领域模型
// ==========================================
// 职责: 定义车间日计划 (Plan)、配棉明细 (BlendEntry) 与输入快照
// 红线: 只描述数据形态,不含分配/汇总逻辑
// ==========================================

use crate::domain::variety::Variety;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// BlendEntry - 配棉明细
// ==========================================
// 计划与品种的关联: 用户录入的重量百分比 + 分配后回写的包数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendEntry {
    pub variety_name: String,             // 品种名称
    pub percentage: f64,                  // 重量占比 (0-100, 不做上下限校验)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_bales: Option<f64>,    // 计算包数 (分配后回写)
}

impl BlendEntry {
    pub fn new(variety_name: &str, percentage: f64) -> Self {
        Self {
            variety_name: variety_name.to_string(),
            percentage,
            calculated_bales: None,
        }
    }
}

// ==========================================
// Plan - 车间日计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,                  // 计划ID
    pub unit_name: String,           // 车间/单元名称
    pub laydown_consumption: f64,    // 每日排包次数
    pub bales_per_laydown: f64,      // 每次排包包数
    #[serde(default)]
    pub blend: Vec<BlendEntry>,      // 配棉明细
}

impl Plan {
    /// 创建新计划,自动分配ID
    pub fn new(unit_name: &str, laydown_consumption: f64, bales_per_laydown: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            unit_name: unit_name.to_string(),
            laydown_consumption,
            bales_per_laydown,
            blend: Vec::new(),
        }
    }

    /// 追加配棉明细 (构建器风格)
    pub fn with_entry(mut self, variety_name: &str, percentage: f64) -> Self {
        self.blend.push(BlendEntry::new(variety_name, percentage));
        self
    }

    /// 目标包数 = 排包次数 × 每次包数
    pub fn target_bales(&self) -> f64 {
        self.laydown_consumption * self.bales_per_laydown
    }

    /// 录入百分比之和 (含非正数条目)
    pub fn percentage_sum(&self) -> f64 {
        self.blend.iter().map(|e| e.percentage).sum()
    }

    /// 配棉是否为空 (无条目或没有正百分比)
    pub fn has_effective_blend(&self) -> bool {
        self.blend.iter().any(|e| e.percentage > 0.0)
    }
}

// ==========================================
// BlendSnapshot - 引擎输入快照
// ==========================================
// 一次计算所需的全部输入: 品种目录 + 车间计划清单
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendSnapshot {
    #[serde(default)]
    pub varieties: Vec<Variety>,
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl BlendSnapshot {
    pub fn new(varieties: Vec<Variety>, plans: Vec<Plan>) -> Self {
        Self { varieties, plans }
    }

    /// 按ID查找计划
    pub fn find_plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bales() {
        let plan = Plan::new("Unit-1", 4.0, 250.0);
        assert_eq!(plan.target_bales(), 1000.0);
    }

    #[test]
    fn test_percentage_sum_includes_non_positive() {
        let plan = Plan::new("Unit-1", 1.0, 1.0)
            .with_entry("A", 60.0)
            .with_entry("B", 45.0)
            .with_entry("C", -5.0);

        assert!((plan.percentage_sum() - 100.0).abs() < 1e-9);
        assert!(plan.has_effective_blend());
    }

    #[test]
    fn test_snapshot_deserialize_inbound_shape() {
        let raw = r#"{
            "varieties": [
                {"id": "v1", "group": "S-6", "variety_name": "A", "avg_bale_weight": 170},
                {"id": "v2", "group": "Imported", "variety_name": "B"}
            ],
            "plans": [
                {"id": "p1", "unit_name": "Unit-1", "laydown_consumption": 4,
                 "bales_per_laydown": 250,
                 "blend": [{"variety_name": "A", "percentage": 60},
                           {"variety_name": "B", "percentage": 40}]}
            ]
        }"#;

        let snapshot: BlendSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.varieties.len(), 2);
        assert_eq!(snapshot.varieties[1].avg_bale_weight, None);
        let plan = snapshot.find_plan("p1").unwrap();
        assert_eq!(plan.blend.len(), 2);
        assert_eq!(plan.blend[0].calculated_bales, None);
    }
}
