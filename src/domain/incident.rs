// ==========================================
// 仓库扫描对账系统 - 异常事件领域模型
// ==========================================
// 红线: 异常记录不可变,应用一次后仅保留用于审计/汇总
// 用途: 多货/串货/短装/退回 四类操作员申报异常
// ==========================================

use crate::domain::types::IncidentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Incident - 异常事件记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    // ===== 标识 =====
    pub incident_id: String,           // 异常ID(UUID)
    pub incident_type: IncidentType,   // 异常类型

    // ===== 目标与数量 =====
    pub code: String,                  // 物料码(CHANGED 时为实际到货码)
    pub quantity: u32,                 // 申报数量(MISSING 允许为 0)
    pub expected_code: Option<String>, // 应收物料码(仅 CHANGED 必填,即目标行)

    // ===== 审计字段 =====
    pub notes: Option<String>,         // 操作员备注
    pub invoiced: Option<bool>,        // 是否已开票(仅 EXTRA 记录确认结果)
    pub created_at: DateTime<Utc>,     // 申报时间
}

impl Incident {
    /// 创建异常记录(校验前的原始构造)
    pub fn new(
        incident_id: String,
        incident_type: IncidentType,
        code: impl Into<String>,
        quantity: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            incident_id,
            incident_type,
            code: code.into(),
            quantity,
            expected_code: None,
            notes: None,
            invoiced: None,
            created_at,
        }
    }

    /// 设置应收物料码(CHANGED 用)
    pub fn with_expected_code(mut self, expected: impl Into<String>) -> Self {
        self.expected_code = Some(expected.into());
        self
    }

    /// 设置操作员备注
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 记录开票确认结果(EXTRA 用)
    pub fn with_invoiced(mut self, invoiced: bool) -> Self {
        self.invoiced = Some(invoiced);
        self
    }

    /// 本异常作用的目标行物料码
    ///
    /// CHANGED 作用于应收行; 其余类型作用于申报码本身
    pub fn target_code(&self) -> &str {
        match self.incident_type {
            IncidentType::Changed => self.expected_code.as_deref().unwrap_or(&self.code),
            _ => &self.code,
        }
    }

    /// 字段校验
    ///
    /// 规则:
    /// - code 非空
    /// - quantity 为正整数(仅 MISSING 允许为 0)
    /// - CHANGED 额外要求 expected_code 非空
    ///
    /// 返回违规原因的 i18n key,无违规返回 None
    pub fn validate(&self) -> Option<&'static str> {
        if self.code.trim().is_empty() {
            return Some("incident.code_required");
        }
        if self.quantity == 0 && !self.incident_type.allows_zero_quantity() {
            return Some("incident.quantity_positive");
        }
        if self.incident_type == IncidentType::Changed {
            match &self.expected_code {
                Some(e) if !e.trim().is_empty() => {}
                _ => return Some("incident.expected_code_required"),
            }
        }
        None
    }
}
