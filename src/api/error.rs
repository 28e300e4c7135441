// ==========================================
// 配棉计算引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换引擎/配置错误为用户友好的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::validator::BlendValidationError;
use thiserror::Error;

/// API层错误类型
/// 配棉校验失败必须包含车间名称与实际合计
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 配棉校验不通过,阻止保存
    #[error("配棉校验失败: {message}")]
    BlendRejected {
        unit_name: String,
        message: String,
        #[source]
        source: BlendValidationError,
    },

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(#[from] ConfigError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 按指定语言构造配棉校验错误
    pub fn blend_rejected(err: BlendValidationError, locale: &str) -> Self {
        ApiError::BlendRejected {
            unit_name: err.unit_name().to_string(),
            message: err.user_message_in(locale),
            source: err,
        }
    }
}

// ==========================================
// 从 BlendValidationError 转换（当前语言）
// ==========================================
impl From<BlendValidationError> for ApiError {
    fn from(err: BlendValidationError) -> Self {
        let locale = crate::i18n::current_locale();
        ApiError::blend_rejected(err, &locale)
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验问题详情
// ==========================================

/// 批量校验中单个车间的问题
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationIssue {
    /// 计划ID
    pub plan_id: String,
    /// 车间名称
    pub unit_name: String,
    /// 用户提示
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_rejected_carries_unit_and_sum() {
        let err = BlendValidationError::PercentageSumMismatch {
            unit_name: "Unit-7".to_string(),
            sum: 97.0,
        };
        let api_err = ApiError::blend_rejected(err, "en");

        match &api_err {
            ApiError::BlendRejected {
                unit_name, message, ..
            } => {
                assert_eq!(unit_name, "Unit-7");
                assert!(message.contains("Unit-7"));
                assert!(message.contains("97"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(api_err.to_string().contains("97"));
    }
}
