// ==========================================
// 仓库扫描对账系统 - 核心库
// ==========================================
// 系统定位: 收货/盘点/拣配/调拨统一扫描对账引擎
// 边界: 持久化/目录检索/支付等归外部后端,本库只做对账核心
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 对账规则
pub mod engine;

// 后端协作层 - 外部契约
pub mod backend;

// 配置层 - 策略与作业档案
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 性能统计
pub mod perf;

// API 层 - 会话门面
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    IncidentType, OverflowPolicy, PerformanceTier, RequirementMeasure, WorkflowKind,
};

// 领域实体
pub use domain::{
    ContainerInstance, ContainerType, Document, DocumentHeader, Incident, Line,
    ReconciliationReport, SubmissionReceipt,
};

// 引擎
pub use engine::{
    CompletionDetector, ContainerTracker, IncidentProcessor, QuantityLedger,
    ReconciliationSession, ScanMatcher, ScanOutcome, SessionClock,
};

// 配置
pub use config::{ConfigManager, ReconciliationConfig, WorkflowProfiles};

// API
pub use api::{ScanSessionApi, ScanStatus};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库扫描对账系统";

// ==========================================
// 预编译检查
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
