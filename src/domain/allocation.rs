// ==========================================
// 配棉计算引擎 - 分配结果领域模型
// ==========================================
// 职责: 定义单车间分配结果与保存载荷
// 说明: 分配结果为临时对象,每次计算重新生成
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// AllocatedEntry - 单品种分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedEntry {
    pub variety_name: String,        // 品种名称
    pub percentage: f64,             // 录入重量占比
    pub avg_bale_weight: f64,        // 实际使用的平均包重
    pub calculated_bales: f64,       // 计算包数
    pub calculated_weight: f64,      // 计算重量 = 包数 × 包重
    pub used_fallback_weight: bool,  // 是否使用了缺省包重
}

// ==========================================
// PlanAllocation - 单车间分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAllocation {
    pub plan_id: String,
    pub unit_name: String,
    pub target_bales: f64,             // 目标包数
    pub weight_factor: f64,            // 权重因子 Σ(pct/100)/包重
    pub total_output_weight: f64,      // 总产出重量
    pub entries: Vec<AllocatedEntry>,
    pub fallback_varieties: Vec<String>, // 使用缺省包重的品种
}

impl PlanAllocation {
    /// 分配为空 (无有效配棉或权重因子为0)
    pub fn is_degenerate(&self) -> bool {
        self.entries.is_empty() || self.total_output_weight <= 0.0
    }

    /// 计算包数合计
    pub fn total_bales(&self) -> f64 {
        self.entries.iter().map(|e| e.calculated_bales).sum()
    }

    /// 计算重量合计
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.calculated_weight).sum()
    }
}

// ==========================================
// FinalizedBlend - 保存载荷
// ==========================================
// 持久化协作方期望的形态: 百分比与包数保留两位小数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedEntry {
    pub variety_name: String,
    pub percentage: f64,
    pub calculated_bales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedBlend {
    pub plan_id: String,
    pub unit_name: String,
    pub target_bales: f64,
    pub blend: Vec<FinalizedEntry>,
}
