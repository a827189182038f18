// ==========================================
// 仓库扫描对账系统 - 对账提交载荷
// ==========================================
// 用途: 定稿时回传后端的最终台账 + 异常日志 + 装箱清单
// 红线: 载荷由已收集状态纯函数构建,提交失败可原样重建重试
// ==========================================

use crate::domain::container::ContainerInstance;
use crate::domain::incident::Incident;
use crate::domain::types::WorkflowKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// LineResult - 单行最终结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineResult {
    pub code: String,            // 物料码
    pub required: u32,           // 最终应收数量(含弹性/异常调整)
    pub packed: u32,             // 最终放置数量
    pub scanned: u32,            // 最终扫描数量
    pub note: Option<String>,    // 审计批注
    pub manual_added: bool,      // 是否手工补录
}

// ==========================================
// ReconciliationReport - 对账报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    // ===== 单据标识 =====
    pub folio: String,                       // 单据号
    pub workflow: WorkflowKind,              // 作业类型
    pub operator: Option<String>,            // 作业员

    // ===== 对账结果 =====
    pub lines: Vec<LineResult>,              // 每行最终数量
    pub incidents: Vec<Incident>,            // 异常日志
    pub containers: Vec<ContainerInstance>,  // 装箱清单

    // ===== 作业统计 =====
    pub elapsed_seconds: i64,                // 作业耗时(秒)
    pub built_at: DateTime<Utc>,             // 报告构建时间
}

impl ReconciliationReport {
    /// 报告内总件数(按扫描口径)
    pub fn total_scanned(&self) -> u32 {
        self.lines.iter().map(|l| l.scanned).sum()
    }

    /// 报告内异常数
    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }
}

// ==========================================
// SubmissionReceipt - 提交回执
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub submission_id: String,         // 后端回执ID
    pub accepted_at: DateTime<Utc>,    // 受理时间
}
