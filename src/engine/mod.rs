// ==========================================
// 仓库扫描对账系统 - 引擎层
// ==========================================
// 职责: 实现对账业务规则,全部为内存纯计算
// 红线: Engine 不做 I/O;拒绝/未命中是控制流不是错误
// ==========================================

pub mod completion;
pub mod container_tracker;
pub mod events;
pub mod incident;
pub mod ledger;
pub mod matcher;
pub mod normalizer;
pub mod runner;
pub mod session;
pub mod session_clock;

// 重导出核心引擎
pub use completion::{CompletionAdjustments, CompletionDetector, DocumentCompletion};
pub use container_tracker::ContainerTracker;
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, ScanEvent, ScanEventPublisher, ScanEventType,
};
pub use incident::{
    AuthorizationGate, DenyAllGate, IncidentError, IncidentFlowState, IncidentInput,
    IncidentProcessor, SupervisorCodeGate,
};
pub use ledger::{ManualAdjust, QuantityLedger, ScanApply};
pub use matcher::{PackContent, ScanMatcher};
pub use normalizer::{normalize_code, CodeNormalizer, SeparatorFoldingNormalizer};
pub use runner::{run_scan_feed, scan_channel, ScanMessage};
pub use session::{ReconciliationSession, ScanOutcome};
pub use session_clock::{rate_performance, SessionClock};
