// ==========================================
// 配棉计算引擎 - 引擎层
// ==========================================
// 职责: 实现配棉分配/汇总/校验规则,不做 I/O
// 红线: 纯同步计算,无共享可变状态,可重入
// ==========================================

pub mod aggregator;
pub mod allocator;
pub mod finalizer;
pub mod validator;

// 重导出核心引擎
pub use aggregator::{BlendAggregator, BlendReport, GroupSummaryRow, UnitDetail, VarietySummaryRow};
pub use allocator::BlendAllocator;
pub use finalizer::{round_to, BlendFinalizer};
pub use validator::{BlendValidationError, BlendValidator};
