// ==========================================
// 配棉计算引擎 - API 层
// ==========================================
// 职责: 对外业务接口,配置装配与错误转换
// ==========================================

pub mod blend_api;
pub mod error;

pub use blend_api::{BlendApi, ReportResponse};
pub use error::{ApiError, ApiResult, ValidationIssue};
