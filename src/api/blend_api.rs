// ==========================================
// 配棉计算引擎 - 配棉 API
// ==========================================
// 职责: 组装配置与引擎,对外提供校验/分配/保存载荷/汇总报表
// 架构: API 层 → Engine 层 (Allocator / Aggregator / Validator / Finalizer)
// 红线: 无状态,每次调用基于调用方传入的快照全量计算
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult, ValidationIssue};
use crate::config::{EngineConfig, EngineConfigReader};
use crate::domain::allocation::{FinalizedBlend, PlanAllocation};
use crate::domain::plan::{BlendSnapshot, Plan};
use crate::domain::variety::VarietyCatalog;
use crate::engine::aggregator::{BlendAggregator, BlendReport, UnitDetail};
use crate::engine::allocator::BlendAllocator;
use crate::engine::finalizer::BlendFinalizer;
use crate::engine::validator::BlendValidator;

// ==========================================
// ReportResponse - 汇总报表响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    /// 生成时间
    pub generated_at: DateTime<Utc>,
    /// 汇总报表
    pub report: BlendReport,
    /// 生成报表时使用的配置
    pub config: EngineConfig,
}

// ==========================================
// BlendApi - 配棉 API
// ==========================================

/// 配棉API
///
/// 职责：
/// 1. 保存前校验（百分比之和 = 100）
/// 2. 单车间分配与保存载荷（保留两位小数）
/// 3. 跨车间汇总报表与单车间明细
///
/// 引擎只持有不可变配置,可在多线程间共享
#[derive(Debug, Clone)]
pub struct BlendApi {
    config: EngineConfig,
    validator: BlendValidator,
    aggregator: BlendAggregator,
    finalizer: BlendFinalizer,
}

impl BlendApi {
    /// 按配置创建 BlendApi
    ///
    /// # 返回
    /// - Err(ApiError::ConfigError): 配置取值无效
    pub fn new(config: EngineConfig) -> ApiResult<Self> {
        config.validate()?;

        let allocator = BlendAllocator::with_default_bale_weight(config.default_bale_weight);
        let validator = BlendValidator::with_tolerance(config.percentage_tolerance);
        let aggregator = BlendAggregator::new()
            .with_allocator(allocator.clone())
            .with_import_keyword(&config.import_group_keyword)
            .with_fallback_group(&config.fallback_group_name)
            .with_grand_total_label(&config.effective_grand_total_label());
        let finalizer = BlendFinalizer::new(allocator, validator.clone())
            .with_decimals(config.rounding_decimals);

        tracing::info!(
            default_bale_weight = config.default_bale_weight,
            percentage_tolerance = config.percentage_tolerance,
            import_group_keyword = %config.import_group_keyword,
            locale = %config.locale,
            "BlendApi 初始化完成"
        );

        Ok(Self {
            config,
            validator,
            aggregator,
            finalizer,
        })
    }

    /// 从配置读取器创建 BlendApi
    pub fn from_config_reader(reader: &dyn EngineConfigReader) -> ApiResult<Self> {
        let config = reader.load_engine_config()?;
        Self::new(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn find_plan<'a>(&self, snapshot: &'a BlendSnapshot, plan_id: &str) -> ApiResult<&'a Plan> {
        snapshot.find_plan(plan_id).ok_or_else(|| {
            ApiError::NotFound(crate::i18n::t_in_locale(
                &self.config.locale,
                "api.plan_not_found",
                &[("id", plan_id)],
            ))
        })
    }

    // ==========================================
    // 校验接口
    // ==========================================

    /// 校验单个车间计划
    ///
    /// # 返回
    /// - Err(ApiError::BlendRejected): 提示包含车间名称与实际合计
    pub fn validate_plan(&self, plan: &Plan) -> ApiResult<()> {
        self.validator
            .validate_plan(plan)
            .map_err(|e| ApiError::blend_rejected(e, &self.config.locale))
    }

    /// 批量校验车间计划
    pub fn validate_roster(&self, plans: &[Plan]) -> Vec<ValidationIssue> {
        plans
            .iter()
            .filter_map(|plan| {
                self.validator
                    .validate_plan(plan)
                    .err()
                    .map(|e| ValidationIssue {
                        plan_id: plan.id.clone(),
                        unit_name: plan.unit_name.clone(),
                        message: e.user_message_in(&self.config.locale),
                    })
            })
            .collect()
    }

    // ==========================================
    // 分配接口
    // ==========================================

    /// 计算单车间分配结果（不校验）
    pub fn allocate_plan(&self, snapshot: &BlendSnapshot, plan_id: &str) -> ApiResult<PlanAllocation> {
        let plan = self.find_plan(snapshot, plan_id)?;
        let catalog = VarietyCatalog::new(&snapshot.varieties);
        Ok(self.aggregator.allocator().allocate(plan, &catalog))
    }

    /// 生成单车间保存载荷
    ///
    /// # 返回
    /// - Ok(FinalizedBlend): 百分比与包数保留配置的小数位
    /// - Err(ApiError::BlendRejected): 校验不通过
    pub fn finalize_plan(&self, snapshot: &BlendSnapshot, plan_id: &str) -> ApiResult<FinalizedBlend> {
        let plan = self.find_plan(snapshot, plan_id)?;
        let catalog = VarietyCatalog::new(&snapshot.varieties);
        self.finalizer
            .finalize(plan, &catalog)
            .map_err(|e| ApiError::blend_rejected(e, &self.config.locale))
    }

    // ==========================================
    // 报表接口
    // ==========================================

    /// 生成跨车间汇总报表
    pub fn build_report(&self, snapshot: &BlendSnapshot) -> ReportResponse {
        let catalog = VarietyCatalog::new(&snapshot.varieties);
        let report = self.aggregator.build_report(&snapshot.plans, &catalog);

        ReportResponse {
            generated_at: Utc::now(),
            report,
            config: self.config.clone(),
        }
    }

    /// 生成单车间明细
    pub fn unit_detail(&self, snapshot: &BlendSnapshot, plan_id: &str) -> ApiResult<UnitDetail> {
        let plan = self.find_plan(snapshot, plan_id)?;
        let catalog = VarietyCatalog::new(&snapshot.varieties);
        Ok(self.aggregator.unit_detail(plan, &catalog))
    }
}
