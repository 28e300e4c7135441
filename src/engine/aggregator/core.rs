// ==========================================
// 配棉计算引擎 - 汇总报表引擎
// ==========================================
// 职责: 各车间分配结果的跨车间汇总
// 输入: 车间计划清单 + 品种目录
// 输出: 品种汇总 + 分组汇总 + 总计 / 单车间明细
// ==========================================

use crate::domain::allocation::PlanAllocation;
use crate::domain::plan::Plan;
use crate::domain::variety::VarietyCatalog;
use crate::engine::allocator::BlendAllocator;
use std::collections::HashMap;
use tracing::{debug, info};

use super::ordering::{compare_group_then_variety, DEFAULT_IMPORT_KEYWORD};
use super::report::{
    BlendReport, GroupSummaryRow, UnitDetail, UnitDetailRow, VarietySummaryRow,
    GRAND_TOTAL_LABEL,
};

/// 目录中不存在的品种归入的分组
pub const DEFAULT_FALLBACK_GROUP: &str = "Ungrouped";

// 包数/重量累加器
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    bales: f64,
    weight: f64,
}

impl Totals {
    fn add(&mut self, bales: f64, weight: f64) {
        self.bales += bales;
        self.weight += weight;
    }
}

/// 占比计算,分母非正时为 0
fn share(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

// ==========================================
// BlendAggregator - 汇总报表引擎
// ==========================================
// 无状态引擎,分组关键字/标签通过构建方法传入
#[derive(Debug, Clone)]
pub struct BlendAggregator {
    allocator: BlendAllocator,
    import_keyword: String,
    fallback_group: String,
    grand_total_label: String,
}

impl BlendAggregator {
    /// 创建汇总引擎 (缺省配置)
    pub fn new() -> Self {
        Self {
            allocator: BlendAllocator::new(),
            import_keyword: DEFAULT_IMPORT_KEYWORD.to_string(),
            fallback_group: DEFAULT_FALLBACK_GROUP.to_string(),
            grand_total_label: GRAND_TOTAL_LABEL.to_string(),
        }
    }

    pub fn with_allocator(mut self, allocator: BlendAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_import_keyword(mut self, keyword: &str) -> Self {
        self.import_keyword = keyword.to_string();
        self
    }

    pub fn with_fallback_group(mut self, group: &str) -> Self {
        self.fallback_group = group.to_string();
        self
    }

    pub fn with_grand_total_label(mut self, label: &str) -> Self {
        self.grand_total_label = label.to_string();
        self
    }

    pub fn allocator(&self) -> &BlendAllocator {
        &self.allocator
    }

    /// 品种所属分组,目录缺失时归入兜底分组
    fn group_for<'a>(&'a self, variety_name: &str, catalog: &'a VarietyCatalog) -> &'a str {
        catalog
            .group_of(variety_name)
            .unwrap_or(self.fallback_group.as_str())
    }

    // ==========================================
    // 跨车间汇总
    // ==========================================

    /// 生成品种/分组汇总报表
    ///
    /// # 参数
    /// - `plans`: 车间计划清单
    /// - `catalog`: 品种目录
    ///
    /// # 返回
    /// 汇总报表; 配棉为空的计划不参与汇总,记入 `skipped_plans`
    pub fn build_report(&self, plans: &[Plan], catalog: &VarietyCatalog) -> BlendReport {
        let allocations: Vec<PlanAllocation> = plans
            .iter()
            .map(|plan| self.allocator.allocate(plan, catalog))
            .collect();

        self.summarize(&allocations, catalog)
    }

    /// 基于已计算的分配结果生成汇总报表
    pub fn summarize(&self, allocations: &[PlanAllocation], catalog: &VarietyCatalog) -> BlendReport {
        // 1. 按品种、分组累加
        let mut variety_totals: HashMap<String, Totals> = HashMap::new();
        let mut variety_groups: HashMap<String, String> = HashMap::new();
        let mut group_totals: HashMap<String, Totals> = HashMap::new();
        let mut grand = Totals::default();
        let mut skipped_plans = Vec::new();
        let mut plan_count = 0;

        for allocation in allocations {
            if allocation.is_degenerate() {
                debug!(
                    plan_id = %allocation.plan_id,
                    unit_name = %allocation.unit_name,
                    "配棉为空,跳过该车间"
                );
                skipped_plans.push(allocation.plan_id.clone());
                continue;
            }
            plan_count += 1;

            for entry in &allocation.entries {
                let group = self.group_for(&entry.variety_name, catalog).to_string();
                let weight = entry.calculated_bales * entry.avg_bale_weight;

                variety_totals
                    .entry(entry.variety_name.clone())
                    .or_default()
                    .add(entry.calculated_bales, weight);
                variety_groups
                    .entry(entry.variety_name.clone())
                    .or_insert_with(|| group.clone());
                group_totals
                    .entry(group)
                    .or_default()
                    .add(entry.calculated_bales, weight);

                // 2. 总计
                grand.add(entry.calculated_bales, weight);
            }
        }

        // 3. 品种汇总行
        let mut variety_rows: Vec<VarietySummaryRow> = variety_totals
            .iter()
            .map(|(variety_name, totals)| {
                let group_name = variety_groups
                    .get(variety_name)
                    .cloned()
                    .unwrap_or_else(|| self.fallback_group.clone());
                let group_bales = group_totals
                    .get(&group_name)
                    .map(|g| g.bales)
                    .unwrap_or(0.0);

                VarietySummaryRow {
                    variety_name: variety_name.clone(),
                    percentage: share(totals.weight, grand.weight),
                    group_percentage: share(totals.bales, group_bales),
                    group_name,
                    bales: totals.bales,
                    weight: totals.weight,
                    is_grand_total: false,
                }
            })
            .collect();

        // 4. 分组汇总行
        let mut group_rows: Vec<GroupSummaryRow> = group_totals
            .iter()
            .map(|(group_name, totals)| GroupSummaryRow {
                group_name: group_name.clone(),
                bales: totals.bales,
                weight: totals.weight,
                percentage: share(totals.weight, grand.weight),
                is_grand_total: false,
            })
            .collect();

        // 5. 排序
        let keyword = self.import_keyword.as_str();
        variety_rows.sort_by(|a, b| {
            compare_group_then_variety(
                (a.group_name.as_str(), a.variety_name.as_str()),
                (b.group_name.as_str(), b.variety_name.as_str()),
                keyword,
            )
        });
        group_rows.sort_by(|a, b| {
            compare_group_then_variety((a.group_name.as_str(), ""), (b.group_name.as_str(), ""), keyword)
        });

        // 6. 总计行 (占比固定 100)
        variety_rows.push(VarietySummaryRow {
            variety_name: self.grand_total_label.clone(),
            group_name: String::new(),
            bales: grand.bales,
            weight: grand.weight,
            percentage: 100.0,
            group_percentage: 100.0,
            is_grand_total: true,
        });
        group_rows.push(GroupSummaryRow {
            group_name: self.grand_total_label.clone(),
            bales: grand.bales,
            weight: grand.weight,
            percentage: 100.0,
            is_grand_total: true,
        });

        info!(
            plans = allocations.len(),
            plan_count = plan_count,
            skipped = skipped_plans.len(),
            varieties = variety_rows.len() - 1,
            groups = group_rows.len() - 1,
            grand_total_bales = grand.bales,
            grand_total_weight = grand.weight,
            "配棉汇总计算完成"
        );

        BlendReport {
            variety_rows,
            group_rows,
            grand_total_bales: grand.bales,
            grand_total_weight: grand.weight,
            plan_count,
            skipped_plans,
        }
    }

    // ==========================================
    // 单车间明细
    // ==========================================

    /// 生成单车间明细
    ///
    /// 占比口径为本车间总重量,不是全厂总重量
    pub fn unit_detail(&self, plan: &Plan, catalog: &VarietyCatalog) -> UnitDetail {
        let allocation = self.allocator.allocate(plan, catalog);
        let total_weight = allocation.total_weight();

        let mut rows: Vec<UnitDetailRow> = allocation
            .entries
            .iter()
            .map(|entry| UnitDetailRow {
                variety_name: entry.variety_name.clone(),
                group_name: self.group_for(&entry.variety_name, catalog).to_string(),
                percentage: entry.percentage,
                bales: entry.calculated_bales,
                weight: entry.calculated_weight,
                weight_percentage: share(entry.calculated_weight, total_weight),
            })
            .collect();

        let keyword = self.import_keyword.as_str();
        rows.sort_by(|a, b| {
            compare_group_then_variety(
                (a.group_name.as_str(), a.variety_name.as_str()),
                (b.group_name.as_str(), b.variety_name.as_str()),
                keyword,
            )
        });

        UnitDetail {
            plan_id: allocation.plan_id.clone(),
            unit_name: allocation.unit_name.clone(),
            target_bales: allocation.target_bales,
            total_output_weight: allocation.total_output_weight,
            total_bales: allocation.total_bales(),
            total_weight,
            rows,
            fallback_varieties: allocation.fallback_varieties,
        }
    }
}

impl Default for BlendAggregator {
    fn default() -> Self {
        Self::new()
    }
}
