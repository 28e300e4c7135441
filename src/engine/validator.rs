// ==========================================
// 配棉计算引擎 - 配棉校验引擎
// ==========================================
// 职责: 保存前校验车间配棉
// 规则:
//   1. 百分比必须为有限值
//   2. 同一车间内品种不可重复
//   3. 百分比之和为 0 (空配棉) 或等于 100 (允许误差 0.01)
//   4. 排包次数、每次包数必须为正
// 红线: 校验不改写输入; 百分比不做 [0,100] 截断
// ==========================================

use crate::domain::plan::Plan;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// 百分比之和缺省允许误差
pub const DEFAULT_PERCENTAGE_TOLERANCE: f64 = 0.01;

/// 视为空配棉的百分比之和阈值
const EMPTY_SUM_EPSILON: f64 = 1e-9;

/// 浮点累加误差余量 (33.33 * 3 = 99.98999999999999)
const SUM_COMPARE_EPSILON: f64 = 1e-9;

// ==========================================
// BlendValidationError - 配棉校验错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlendValidationError {
    #[error("车间 {unit_name} 配棉百分比之和为 {sum:.2}, 应为 100")]
    PercentageSumMismatch { unit_name: String, sum: f64 },

    #[error("车间 {unit_name} 配棉品种重复: {variety_name}")]
    DuplicateVariety {
        unit_name: String,
        variety_name: String,
    },

    #[error("车间 {unit_name} 品种 {variety_name} 百分比无效: {percentage}")]
    InvalidPercentage {
        unit_name: String,
        variety_name: String,
        percentage: f64,
    },

    #[error("车间 {unit_name} 字段 {field} 无效: {value} (必须为正数)")]
    InvalidConsumption {
        unit_name: String,
        field: String,
        value: f64,
    },
}

impl BlendValidationError {
    /// 出错的车间名称
    pub fn unit_name(&self) -> &str {
        match self {
            BlendValidationError::PercentageSumMismatch { unit_name, .. }
            | BlendValidationError::DuplicateVariety { unit_name, .. }
            | BlendValidationError::InvalidPercentage { unit_name, .. }
            | BlendValidationError::InvalidConsumption { unit_name, .. } => unit_name,
        }
    }

    /// 提示文案键与参数
    fn message_key_and_args(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            BlendValidationError::PercentageSumMismatch { unit_name, sum } => (
                "validation.sum_mismatch",
                vec![("unit", unit_name.clone()), ("sum", format!("{:.2}", sum))],
            ),
            BlendValidationError::DuplicateVariety {
                unit_name,
                variety_name,
            } => (
                "validation.duplicate_variety",
                vec![("unit", unit_name.clone()), ("variety", variety_name.clone())],
            ),
            BlendValidationError::InvalidPercentage {
                unit_name,
                variety_name,
                percentage,
            } => (
                "validation.invalid_percentage",
                vec![
                    ("unit", unit_name.clone()),
                    ("variety", variety_name.clone()),
                    ("value", percentage.to_string()),
                ],
            ),
            BlendValidationError::InvalidConsumption {
                unit_name,
                field,
                value,
            } => (
                "validation.invalid_consumption",
                vec![
                    ("unit", unit_name.clone()),
                    ("field", field.clone()),
                    ("value", value.to_string()),
                ],
            ),
        }
    }

    /// 国际化后的用户提示（指定语言）
    pub fn user_message_in(&self, locale: &str) -> String {
        let (key, args) = self.message_key_and_args();
        let args: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
        crate::i18n::t_in_locale(locale, key, &args)
    }

    /// 国际化后的用户提示（当前语言）
    pub fn user_message(&self) -> String {
        self.user_message_in(&crate::i18n::current_locale())
    }
}

// ==========================================
// BlendValidator - 配棉校验引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct BlendValidator {
    tolerance: f64,
}

impl BlendValidator {
    /// 创建校验引擎 (允许误差 0.01)
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_PERCENTAGE_TOLERANCE,
        }
    }

    /// 使用指定允许误差创建校验引擎
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// 校验车间计划 (字段 + 配棉)
    pub fn validate_plan(&self, plan: &Plan) -> Result<(), BlendValidationError> {
        self.validate_plan_shape(plan)?;
        self.validate_blend(plan)
    }

    /// 校验排包次数与每次包数
    pub fn validate_plan_shape(&self, plan: &Plan) -> Result<(), BlendValidationError> {
        for (field, value) in [
            ("laydown_consumption", plan.laydown_consumption),
            ("bales_per_laydown", plan.bales_per_laydown),
        ] {
            if !value.is_finite() || value <= 0.0 {
                warn!(
                    plan_id = %plan.id,
                    unit_name = %plan.unit_name,
                    field = field,
                    value = value,
                    "车间计划字段无效"
                );
                return Err(BlendValidationError::InvalidConsumption {
                    unit_name: plan.unit_name.clone(),
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// 校验配棉明细
    ///
    /// # 返回
    /// - `Ok(())`: 配棉为空或百分比之和在误差范围内等于 100
    /// - `Err`: 第一个违反的规则
    pub fn validate_blend(&self, plan: &Plan) -> Result<(), BlendValidationError> {
        let mut seen = HashSet::new();

        for entry in &plan.blend {
            if !entry.percentage.is_finite() {
                warn!(
                    unit_name = %plan.unit_name,
                    variety_name = %entry.variety_name,
                    "配棉百分比为 NaN 或无穷大"
                );
                return Err(BlendValidationError::InvalidPercentage {
                    unit_name: plan.unit_name.clone(),
                    variety_name: entry.variety_name.clone(),
                    percentage: entry.percentage,
                });
            }

            if !seen.insert(entry.variety_name.as_str()) {
                warn!(
                    unit_name = %plan.unit_name,
                    variety_name = %entry.variety_name,
                    "配棉品种重复"
                );
                return Err(BlendValidationError::DuplicateVariety {
                    unit_name: plan.unit_name.clone(),
                    variety_name: entry.variety_name.clone(),
                });
            }
        }

        let sum = plan.percentage_sum();
        if sum.abs() < EMPTY_SUM_EPSILON {
            debug!(unit_name = %plan.unit_name, "配棉为空,校验通过");
            return Ok(());
        }

        if (sum - 100.0).abs() > self.tolerance + SUM_COMPARE_EPSILON {
            warn!(
                plan_id = %plan.id,
                unit_name = %plan.unit_name,
                sum = sum,
                tolerance = self.tolerance,
                "配棉百分比之和不等于 100"
            );
            return Err(BlendValidationError::PercentageSumMismatch {
                unit_name: plan.unit_name.clone(),
                sum,
            });
        }

        debug!(unit_name = %plan.unit_name, sum = sum, "配棉校验通过");
        Ok(())
    }

    /// 批量校验,返回所有不通过的车间 (每个车间最多一条)
    pub fn validate_roster(&self, plans: &[Plan]) -> Vec<BlendValidationError> {
        plans
            .iter()
            .filter_map(|plan| self.validate_plan(plan).err())
            .collect()
    }
}

impl Default for BlendValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_blend_passes() {
        let validator = BlendValidator::new();
        let plan = Plan::new("Unit-1", 4.0, 250.0)
            .with_entry("A", 60.0)
            .with_entry("B", 40.0);
        assert!(validator.validate_plan(&plan).is_ok());
    }

    #[test]
    fn test_within_tolerance_passes() {
        let validator = BlendValidator::new();
        let plan = Plan::new("Unit-1", 4.0, 250.0)
            .with_entry("A", 33.33)
            .with_entry("B", 33.33)
            .with_entry("C", 33.335);
        assert!(validator.validate_plan(&plan).is_ok());
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let validator = BlendValidator::new();

        // 99.99: 三等分
        let plan = Plan::new("Unit-1", 4.0, 250.0)
            .with_entry("A", 33.33)
            .with_entry("B", 33.33)
            .with_entry("C", 33.33);
        assert!(validator.validate_plan(&plan).is_ok());

        let plan = Plan::new("Unit-1", 4.0, 250.0)
            .with_entry("A", 70.0)
            .with_entry("B", 29.99);
        assert!(validator.validate_plan(&plan).is_ok());

        // 100.01
        let plan = Plan::new("Unit-1", 4.0, 250.0)
            .with_entry("A", 60.0)
            .with_entry("B", 40.01);
        assert!(validator.validate_plan(&plan).is_ok());

        // 超出误差
        let plan = Plan::new("Unit-1", 4.0, 250.0)
            .with_entry("A", 70.0)
            .with_entry("B", 29.98);
        assert!(validator.validate_plan(&plan).is_err());

        let plan = Plan::new("Unit-1", 4.0, 250.0)
            .with_entry("A", 60.0)
            .with_entry("B", 40.02);
        assert!(validator.validate_plan(&plan).is_err());
    }

    #[test]
    fn test_sum_97_rejected_with_unit_and_sum() {
        // 场景B: 百分比之和 97
        let validator = BlendValidator::new();
        let plan = Plan::new("Ring Frame 3", 4.0, 250.0)
            .with_entry("A", 57.0)
            .with_entry("B", 40.0);

        let err = validator.validate_plan(&plan).unwrap_err();
        assert_eq!(err.unit_name(), "Ring Frame 3");
        match &err {
            BlendValidationError::PercentageSumMismatch { sum, .. } => {
                assert!((sum - 97.0).abs() < 1e-9)
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let message = err.to_string();
        assert!(message.contains("Ring Frame 3"));
        assert!(message.contains("97"));
    }

    #[test]
    fn test_empty_blend_passes() {
        let validator = BlendValidator::new();
        let empty = Plan::new("Unit-1", 4.0, 250.0);
        let zeroed = Plan::new("Unit-2", 4.0, 250.0).with_entry("A", 0.0);
        assert!(validator.validate_plan(&empty).is_ok());
        assert!(validator.validate_plan(&zeroed).is_ok());
    }

    #[test]
    fn test_out_of_range_percentages_not_rejected_when_sum_is_100() {
        let validator = BlendValidator::new();
        let plan = Plan::new("Unit-1", 1.0, 100.0)
            .with_entry("A", 120.0)
            .with_entry("B", -20.0);
        assert!(validator.validate_plan(&plan).is_ok());
    }

    #[test]
    fn test_duplicate_variety_rejected() {
        let validator = BlendValidator::new();
        let plan = Plan::new("Unit-1", 1.0, 100.0)
            .with_entry("A", 50.0)
            .with_entry("A", 50.0);
        assert!(matches!(
            validator.validate_plan(&plan),
            Err(BlendValidationError::DuplicateVariety { .. })
        ));
    }

    #[test]
    fn test_nan_percentage_rejected() {
        let validator = BlendValidator::new();
        let plan = Plan::new("Unit-1", 1.0, 100.0).with_entry("A", f64::NAN);
        assert!(matches!(
            validator.validate_plan(&plan),
            Err(BlendValidationError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn test_non_positive_consumption_rejected() {
        let validator = BlendValidator::new();
        let plan = Plan::new("Unit-1", 0.0, 100.0).with_entry("A", 100.0);
        assert!(matches!(
            validator.validate_plan(&plan),
            Err(BlendValidationError::InvalidConsumption { .. })
        ));
    }

    #[test]
    fn test_validate_roster_collects_all_failures() {
        let validator = BlendValidator::new();
        let plans = vec![
            Plan::new("Unit-1", 1.0, 100.0).with_entry("A", 100.0),
            Plan::new("Unit-2", 1.0, 100.0).with_entry("A", 90.0),
            Plan::new("Unit-3", 1.0, 100.0).with_entry("A", 101.0),
        ];

        let errors = validator.validate_roster(&plans);
        let units: Vec<&str> = errors.iter().map(|e| e.unit_name()).collect();
        assert_eq!(units, vec!["Unit-2", "Unit-3"]);
    }
}
