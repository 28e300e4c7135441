// ==========================================
// 配棉计算引擎 - 领域模型层
// ==========================================
// 职责: 定义品种、车间计划、分配结果等领域实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod plan;
pub mod variety;

// 重导出核心类型
pub use allocation::{AllocatedEntry, FinalizedBlend, FinalizedEntry, PlanAllocation};
pub use plan::{BlendEntry, BlendSnapshot, Plan};
pub use variety::{Variety, VarietyCatalog, DEFAULT_AVG_BALE_WEIGHT};
