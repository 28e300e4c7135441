// ==========================================
// 汇总报表行定义
// ==========================================

use serde::{Deserialize, Serialize};

/// 总计行缺省标签
pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

// ==========================================
// VarietySummaryRow - 品种汇总行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarietySummaryRow {
    /// 品种名称 (总计行为 "Grand Total")
    pub variety_name: String,

    /// 所属分组 (总计行为空串)
    pub group_name: String,

    /// 包数合计
    pub bales: f64,

    /// 重量合计
    pub weight: f64,

    /// 占全部配棉的重量百分比
    pub percentage: f64,

    /// 组内包数百分比
    pub group_percentage: f64,

    /// 是否为总计行
    pub is_grand_total: bool,
}

// ==========================================
// GroupSummaryRow - 分组汇总行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummaryRow {
    pub group_name: String,
    pub bales: f64,
    pub weight: f64,
    pub percentage: f64,
    pub is_grand_total: bool,
}

// ==========================================
// BlendReport - 跨车间汇总报表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendReport {
    /// 品种汇总 (已排序,末行为总计)
    pub variety_rows: Vec<VarietySummaryRow>,

    /// 分组汇总 (已排序,末行为总计)
    pub group_rows: Vec<GroupSummaryRow>,

    pub grand_total_bales: f64,
    pub grand_total_weight: f64,

    /// 参与汇总的车间数
    pub plan_count: usize,

    /// 因配棉为空被跳过的计划ID
    pub skipped_plans: Vec<String>,
}

impl BlendReport {
    /// 不含总计行的品种汇总
    pub fn variety_data_rows(&self) -> impl Iterator<Item = &VarietySummaryRow> {
        self.variety_rows.iter().filter(|r| !r.is_grand_total)
    }

    /// 不含总计行的分组汇总
    pub fn group_data_rows(&self) -> impl Iterator<Item = &GroupSummaryRow> {
        self.group_rows.iter().filter(|r| !r.is_grand_total)
    }

    pub fn find_variety(&self, variety_name: &str) -> Option<&VarietySummaryRow> {
        self.variety_data_rows().find(|r| r.variety_name == variety_name)
    }

    pub fn find_group(&self, group_name: &str) -> Option<&GroupSummaryRow> {
        self.group_data_rows().find(|r| r.group_name == group_name)
    }
}

// ==========================================
// UnitDetail - 单车间明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDetailRow {
    pub variety_name: String,
    pub group_name: String,
    pub percentage: f64,        // 录入百分比
    pub bales: f64,             // 计算包数
    pub weight: f64,            // 计算重量
    pub weight_percentage: f64, // 占本车间总重量百分比
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDetail {
    pub plan_id: String,
    pub unit_name: String,
    pub target_bales: f64,
    pub total_output_weight: f64,
    pub total_bales: f64,
    pub total_weight: f64,
    pub rows: Vec<UnitDetailRow>,
    pub fallback_varieties: Vec<String>,
}
