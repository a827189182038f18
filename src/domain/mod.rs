// ==========================================
// 仓库扫描对账系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、提交载荷
// 红线: 不含引擎逻辑,不含任何 I/O
// ==========================================

pub mod container;
pub mod incident;
pub mod line;
pub mod report;
pub mod types;

// 重导出核心类型
pub use container::{ContainerInstance, ContainerType};
pub use incident::Incident;
pub use line::{Document, DocumentHeader, Line};
pub use report::{LineResult, ReconciliationReport, SubmissionReceipt};
pub use types::{
    IncidentType, OverflowPolicy, PerformanceTier, RequirementMeasure, WorkflowKind,
};
