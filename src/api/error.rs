// ==========================================
// 仓库扫描对账系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换后端/引擎错误为用户可解释的错误
// 红线: 可解释性 - 所有错误信息必须包含显式原因
// ==========================================

use crate::backend::error::BackendError;
use crate::engine::incident::IncidentError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("授权失败: {0}")]
    Unauthorized(String),

    /// 定稿前置条件不满足
    #[error("单据未完成: 缺口 {deficit} 件")]
    IncompleteDocument { deficit: i64 },

    // ==========================================
    // 提交错误 (可重试)
    // ==========================================
    /// 提交失败不丢失已扫数据,调用方应提供显式重试入口
    #[error("提交失败(可重试): {0}")]
    SubmissionFailure(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 BackendError 转换
// 目的: 把后端技术错误转换为用户可解释的业务错误
// ==========================================
impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DocumentNotFound { folio } => {
                ApiError::NotFound(format!("单据{}不存在", folio))
            }
            BackendError::Unavailable(msg) => ApiError::SubmissionFailure(msg),
            BackendError::Rejected(msg) => ApiError::SubmissionFailure(msg),
            BackendError::InternalError(msg) => ApiError::InternalError(msg),
            BackendError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 IncidentError 转换
// ==========================================
impl From<IncidentError> for ApiError {
    fn from(err: IncidentError) -> Self {
        match err {
            IncidentError::ValidationFailed { reason_key } => {
                ApiError::ValidationError(crate::i18n::t(reason_key))
            }
            IncidentError::Unauthorized => {
                ApiError::Unauthorized(crate::i18n::t("incident.unauthorized"))
            }
            IncidentError::UnknownLine { code } => {
                ApiError::NotFound(crate::i18n::t_with_args(
                    "incident.unknown_line",
                    &[("code", &code)],
                ))
            }
            IncidentError::InvalidFlowState { current, expected } => ApiError::InvalidInput(
                format!("异常流程状态错误: 当前{}, 期望{}", current, expected),
            ),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_conversion() {
        let err: ApiError = BackendError::DocumentNotFound {
            folio: "REC-001".to_string(),
        }
        .into();
        match err {
            ApiError::NotFound(msg) => assert!(msg.contains("REC-001")),
            _ => panic!("Expected NotFound"),
        }

        let err: ApiError = BackendError::Unavailable("连接超时".to_string()).into();
        assert!(matches!(err, ApiError::SubmissionFailure(_)));
    }

    #[test]
    fn test_incident_error_conversion() {
        let err: ApiError = IncidentError::Unauthorized.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = IncidentError::UnknownLine {
            code: "X1".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
