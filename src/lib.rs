// ==========================================
// 配棉计算引擎 - 核心库
// ==========================================
// 职责: 车间配棉包数分配 + 跨车间品种/分组汇总
// 系统定位: 纺织厂运营看板后台的计算模块 (纯计算,无 I/O)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 分配/汇总/校验
pub mod engine;

// 配置层 - 引擎配置
pub mod config;

// 数据库基础设施（配置库连接初始化）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    AllocatedEntry, BlendEntry, BlendSnapshot, FinalizedBlend, Plan, PlanAllocation, Variety,
    VarietyCatalog,
};

// 引擎
pub use engine::{BlendAggregator, BlendAllocator, BlendFinalizer, BlendReport, BlendValidator};

// 配置
pub use config::{ConfigManager, EngineConfig};

// API
pub use api::{ApiError, ApiResult, BlendApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "配棉计算引擎";
