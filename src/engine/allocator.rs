// ==========================================
// 配棉计算引擎 - 包数分配引擎
// ==========================================
// 职责: 单车间目标包数 + 配棉百分比 → 各品种计算包数/重量
// 输入: 车间计划 + 品种目录
// 输出: PlanAllocation
// ==========================================
// 算法: 加权调和分配
//   contribution  = (pct / 100) / 包重
//   weight_factor = Σ contribution
//   总产出重量    = 目标包数 / weight_factor   (weight_factor = 0 时为 0)
//   计算包数      = (总产出重量 × pct / 100) / 包重
// 红线: 不抛错; 空配棉/零权重因子返回空结果
// 红线: 百分比不做 [0,100] 截断,仅记录告警
// ==========================================

use crate::domain::allocation::{AllocatedEntry, PlanAllocation};
use crate::domain::plan::{BlendEntry, Plan};
use crate::domain::variety::{VarietyCatalog, DEFAULT_AVG_BALE_WEIGHT};
use tracing::{debug, warn};

// ==========================================
// BlendAllocator - 包数分配引擎
// ==========================================
// 无状态引擎,只持有缺省包重配置
#[derive(Debug, Clone)]
pub struct BlendAllocator {
    default_bale_weight: f64,
}

impl BlendAllocator {
    /// 创建分配引擎 (缺省包重 170)
    pub fn new() -> Self {
        Self {
            default_bale_weight: DEFAULT_AVG_BALE_WEIGHT,
        }
    }

    /// 使用指定缺省包重创建分配引擎
    ///
    /// 非正数或非有限值时仍使用 170
    pub fn with_default_bale_weight(default_bale_weight: f64) -> Self {
        let default_bale_weight = if default_bale_weight.is_finite() && default_bale_weight > 0.0 {
            default_bale_weight
        } else {
            warn!(
                default_bale_weight = default_bale_weight,
                "缺省包重无效,使用 {}", DEFAULT_AVG_BALE_WEIGHT
            );
            DEFAULT_AVG_BALE_WEIGHT
        };
        Self { default_bale_weight }
    }

    pub fn default_bale_weight(&self) -> f64 {
        self.default_bale_weight
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算单车间分配结果
    ///
    /// # 参数
    /// - `plan`: 车间计划
    /// - `catalog`: 品种目录
    ///
    /// # 返回
    /// 分配结果; 配棉为空时 `entries` 为空,权重因子为 0 时包数全为 0
    pub fn allocate(&self, plan: &Plan, catalog: &VarietyCatalog) -> PlanAllocation {
        let target_bales = plan.target_bales();

        debug!(
            plan_id = %plan.id,
            unit_name = %plan.unit_name,
            target_bales = target_bales,
            blend_entries = plan.blend.len(),
            "开始计算车间分配"
        );

        let (weight_factor, total_output_weight, entries) =
            self.allocate_blend(target_bales, &plan.blend, catalog);

        // 同一品种重复出现时只记录一次
        let mut fallback_varieties: Vec<String> = Vec::new();
        for entry in entries.iter().filter(|e| e.used_fallback_weight) {
            if !fallback_varieties.contains(&entry.variety_name) {
                fallback_varieties.push(entry.variety_name.clone());
            }
        }

        if !fallback_varieties.is_empty() {
            warn!(
                plan_id = %plan.id,
                unit_name = %plan.unit_name,
                fallback_varieties = ?fallback_varieties,
                default_bale_weight = self.default_bale_weight,
                "部分品种使用缺省包重计算"
            );
        }

        PlanAllocation {
            plan_id: plan.id.clone(),
            unit_name: plan.unit_name.clone(),
            target_bales,
            weight_factor,
            total_output_weight,
            entries,
            fallback_varieties,
        }
    }

    /// 按目标包数分配配棉明细
    ///
    /// # 返回
    /// (权重因子, 总产出重量, 分配明细)
    ///
    /// # 注意
    /// 百分比 <= 0 的条目在计算前剔除,不出现在结果中
    pub fn allocate_blend(
        &self,
        target_bales: f64,
        blend: &[BlendEntry],
        catalog: &VarietyCatalog,
    ) -> (f64, f64, Vec<AllocatedEntry>) {
        // 1. 剔除非正百分比,解析包重
        let resolved: Vec<(&BlendEntry, f64, bool)> = blend
            .iter()
            .filter(|e| e.percentage > 0.0)
            .map(|e| {
                if e.percentage > 100.0 {
                    warn!(
                        variety_name = %e.variety_name,
                        percentage = e.percentage,
                        "配棉百分比超过 100,按录入值计算"
                    );
                }
                let (weight, fallback) = self.resolve_bale_weight(&e.variety_name, catalog);
                (e, weight, fallback)
            })
            .collect();

        if resolved.is_empty() {
            debug!("配棉为空,返回空分配结果");
            return (0.0, 0.0, Vec::new());
        }

        // 2. 权重因子
        let weight_factor: f64 = resolved
            .iter()
            .map(|(e, weight, _)| (e.percentage / 100.0) / weight)
            .sum();

        // 3. 总产出重量
        let total_output_weight = if weight_factor > 0.0 {
            target_bales / weight_factor
        } else {
            0.0
        };

        // 4. 各品种包数与重量
        let entries = resolved
            .into_iter()
            .map(|(e, weight, fallback)| {
                let calculated_bales = (total_output_weight * e.percentage / 100.0) / weight;
                AllocatedEntry {
                    variety_name: e.variety_name.clone(),
                    percentage: e.percentage,
                    avg_bale_weight: weight,
                    calculated_bales,
                    calculated_weight: calculated_bales * weight,
                    used_fallback_weight: fallback,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            weight_factor = weight_factor,
            total_output_weight = total_output_weight,
            entries = entries.len(),
            "车间分配计算完成"
        );

        (weight_factor, total_output_weight, entries)
    }

    /// 解析品种包重
    ///
    /// # 返回
    /// (包重, 是否回退到缺省值)
    pub fn resolve_bale_weight(&self, variety_name: &str, catalog: &VarietyCatalog) -> (f64, bool) {
        match catalog.get(variety_name) {
            Some(variety) => (
                variety.effective_bale_weight(self.default_bale_weight),
                variety.uses_fallback_weight(),
            ),
            None => (self.default_bale_weight, true),
        }
    }
}

impl Default for BlendAllocator {
    fn default() -> Self {
        Self::new()
    }
}
