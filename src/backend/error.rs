// ==========================================
// 仓库扫描对账系统 - 后端协作方错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 后端协作方错误类型
#[derive(Error, Debug)]
pub enum BackendError {
    // ===== 拉取错误 =====
    #[error("单据不存在: {folio}")]
    DocumentNotFound { folio: String },

    // ===== 提交错误 =====
    #[error("后端不可用: {0}")]
    Unavailable(String),

    #[error("提交被后端拒绝: {0}")]
    Rejected(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type BackendResult<T> = Result<T, BackendError>;
