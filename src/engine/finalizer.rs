// ==========================================
// 配棉计算引擎 - 保存载荷生成
// ==========================================
// 职责: 校验 → 分配 → 按小数位取整,生成持久化载荷
// 输出: FinalizedBlend {variety_name, percentage, calculated_bales}
// 红线: 校验不通过不生成载荷
// ==========================================

use crate::domain::allocation::{FinalizedBlend, FinalizedEntry};
use crate::domain::plan::Plan;
use crate::domain::variety::VarietyCatalog;
use crate::engine::allocator::BlendAllocator;
use crate::engine::validator::{BlendValidationError, BlendValidator};
use tracing::info;

/// 保存载荷缺省保留小数位
pub const DEFAULT_ROUNDING_DECIMALS: u32 = 2;

/// 四舍五入到指定小数位 (远离零方向)
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ==========================================
// BlendFinalizer - 保存载荷生成器
// ==========================================
#[derive(Debug, Clone)]
pub struct BlendFinalizer {
    allocator: BlendAllocator,
    validator: BlendValidator,
    decimals: u32,
}

impl BlendFinalizer {
    pub fn new(allocator: BlendAllocator, validator: BlendValidator) -> Self {
        Self {
            allocator,
            validator,
            decimals: DEFAULT_ROUNDING_DECIMALS,
        }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// 生成保存载荷
    ///
    /// # 返回
    /// - `Ok(FinalizedBlend)`: 百分比 <= 0 的条目不出现在载荷中
    /// - `Err(BlendValidationError)`: 校验不通过,阻止保存
    pub fn finalize(
        &self,
        plan: &Plan,
        catalog: &VarietyCatalog,
    ) -> Result<FinalizedBlend, BlendValidationError> {
        self.validator.validate_plan(plan)?;

        let allocation = self.allocator.allocate(plan, catalog);
        let blend = allocation
            .entries
            .iter()
            .map(|entry| FinalizedEntry {
                variety_name: entry.variety_name.clone(),
                percentage: round_to(entry.percentage, self.decimals),
                calculated_bales: round_to(entry.calculated_bales, self.decimals),
            })
            .collect::<Vec<_>>();

        info!(
            plan_id = %plan.id,
            unit_name = %plan.unit_name,
            entries = blend.len(),
            target_bales = allocation.target_bales,
            "配棉保存载荷生成完成"
        );

        Ok(FinalizedBlend {
            plan_id: plan.id.clone(),
            unit_name: plan.unit_name.clone(),
            target_bales: allocation.target_bales,
            blend,
        })
    }

    /// 将计算包数回写到计划副本
    ///
    /// 未参与分配的条目 (百分比 <= 0) 回写 0
    pub fn apply_to_plan(
        &self,
        plan: &Plan,
        catalog: &VarietyCatalog,
    ) -> Result<Plan, BlendValidationError> {
        let finalized = self.finalize(plan, catalog)?;

        let mut updated = plan.clone();
        for entry in updated.blend.iter_mut() {
            let bales = finalized
                .blend
                .iter()
                .find(|f| f.variety_name == entry.variety_name)
                .map(|f| f.calculated_bales)
                .unwrap_or(0.0);
            entry.calculated_bales = Some(bales);
        }

        Ok(updated)
    }
}

impl Default for BlendFinalizer {
    fn default() -> Self {
        Self::new(BlendAllocator::new(), BlendValidator::new())
    }
}
