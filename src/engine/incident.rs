// ==========================================
// 仓库扫描对账系统 - 异常处理引擎
// ==========================================
// 职责: 异常申报状态机 + 校验 + 台账核销 + 审计留痕
// 流程: 选类型 → [仅多货: 开票确认 → (已开票则密码授权)] → 录入 → 应用
// 红线: apply 前零副作用,中途放弃不留任何台账变更
// 红线: 每个异常ID只应用一次(幂等)
// ==========================================

use crate::domain::incident::Incident;
use crate::domain::types::IncidentType;
use crate::engine::ledger::QuantityLedger;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// 授权门 Trait (密码闸口)
// ==========================================

/// 多货开票路径的授权接口
///
/// Engine 层定义,具体口令来源由配置层/外部系统实现
pub trait AuthorizationGate: Send + Sync {
    /// 校验口令
    fn authorize(&self, password: &str) -> bool;
}

/// 主管口令授权门(配置层提供口令)
pub struct SupervisorCodeGate {
    code: String,
}

impl SupervisorCodeGate {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl AuthorizationGate for SupervisorCodeGate {
    fn authorize(&self, password: &str) -> bool {
        !self.code.is_empty() && self.code == password
    }
}

/// 拒绝一切授权(未配置口令时的安全默认)
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllGate;

impl AuthorizationGate for DenyAllGate {
    fn authorize(&self, _password: &str) -> bool {
        false
    }
}

// ==========================================
// 错误类型
// ==========================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IncidentError {
    /// 状态机走位错误(如未选类型就录入)
    #[error("异常流程状态错误: 当前 {current}, 期望 {expected}")]
    InvalidFlowState {
        current: &'static str,
        expected: &'static str,
    },

    /// 字段校验失败(携带 i18n key)
    #[error("异常字段校验失败: {reason_key}")]
    ValidationFailed { reason_key: &'static str },

    /// 授权失败
    #[error("授权失败")]
    Unauthorized,

    /// 目标行不存在
    #[error("目标行不存在: {code}")]
    UnknownLine { code: String },
}

// ==========================================
// IncidentInput - 录入表单数据
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct IncidentInput {
    pub code: String,                  // 物料码(已归一化)
    pub quantity: u32,                 // 申报数量
    pub expected_code: Option<String>, // 应收物料码(CHANGED 必填,已归一化)
    pub notes: Option<String>,         // 操作员备注
}

// ==========================================
// IncidentFlowState - 申报流程状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentFlowState {
    /// 空闲
    Idle,
    /// 多货: 等待"是否已开票"确认
    ConfirmingBilling,
    /// 多货已开票: 等待口令授权
    AwaitingAuthorization,
    /// 录入中
    EnteringData {
        incident_type: IncidentType,
        invoiced: Option<bool>,
    },
}

impl IncidentFlowState {
    fn name(&self) -> &'static str {
        match self {
            IncidentFlowState::Idle => "IDLE",
            IncidentFlowState::ConfirmingBilling => "CONFIRMING_BILLING",
            IncidentFlowState::AwaitingAuthorization => "AWAITING_AUTHORIZATION",
            IncidentFlowState::EnteringData { .. } => "ENTERING_DATA",
        }
    }
}

// ==========================================
// IncidentProcessor - 异常处理器
// ==========================================
pub struct IncidentProcessor {
    state: IncidentFlowState,
    gate: Arc<dyn AuthorizationGate>,
    log: Vec<Incident>,          // 审计日志(申报顺序)
    applied: HashSet<String>,    // 已应用的异常ID(幂等保证)
}

impl IncidentProcessor {
    /// 创建处理器(注入授权门)
    pub fn new(gate: Arc<dyn AuthorizationGate>) -> Self {
        Self {
            state: IncidentFlowState::Idle,
            gate,
            log: Vec::new(),
            applied: HashSet::new(),
        }
    }

    /// 当前流程状态
    pub fn state(&self) -> IncidentFlowState {
        self.state
    }

    /// 审计日志
    pub fn incidents(&self) -> &[Incident] {
        &self.log
    }

    // ==========================================
    // 状态机推进
    // ==========================================

    /// 选择异常类型,开始申报流程
    ///
    /// 多货先进开票确认;其余类型直接进录入
    pub fn begin(&mut self, incident_type: IncidentType) -> Result<(), IncidentError> {
        if self.state != IncidentFlowState::Idle {
            return Err(IncidentError::InvalidFlowState {
                current: self.state.name(),
                expected: "IDLE",
            });
        }
        self.state = match incident_type {
            IncidentType::Extra => IncidentFlowState::ConfirmingBilling,
            other => IncidentFlowState::EnteringData {
                incident_type: other,
                invoiced: None,
            },
        };
        Ok(())
    }

    /// 多货开票确认
    ///
    /// 已开票 → 进授权;未开票 → 直接进录入(口令闸口只保护开票路径)
    pub fn confirm_billing(&mut self, invoiced: bool) -> Result<(), IncidentError> {
        if self.state != IncidentFlowState::ConfirmingBilling {
            return Err(IncidentError::InvalidFlowState {
                current: self.state.name(),
                expected: "CONFIRMING_BILLING",
            });
        }
        self.state = if invoiced {
            IncidentFlowState::AwaitingAuthorization
        } else {
            IncidentFlowState::EnteringData {
                incident_type: IncidentType::Extra,
                invoiced: Some(false),
            }
        };
        Ok(())
    }

    /// 口令授权
    ///
    /// 授权失败停留原状态,可重试或取消
    pub fn authorize(&mut self, password: &str) -> Result<(), IncidentError> {
        if self.state != IncidentFlowState::AwaitingAuthorization {
            return Err(IncidentError::InvalidFlowState {
                current: self.state.name(),
                expected: "AWAITING_AUTHORIZATION",
            });
        }
        if !self.gate.authorize(password) {
            return Err(IncidentError::Unauthorized);
        }
        self.state = IncidentFlowState::EnteringData {
            incident_type: IncidentType::Extra,
            invoiced: Some(true),
        };
        Ok(())
    }

    /// 放弃当前申报流程(零副作用)
    pub fn cancel(&mut self) {
        self.state = IncidentFlowState::Idle;
    }

    // ==========================================
    // 应用与记录
    // ==========================================

    /// 提交录入表单: 校验 → 核销台账 → 记录审计
    ///
    /// 校验失败或目标行缺失时不记录任何东西,流程停留录入态
    pub fn submit(
        &mut self,
        input: IncidentInput,
        ledger: &mut QuantityLedger,
        now: DateTime<Utc>,
    ) -> Result<Incident, IncidentError> {
        let (incident_type, invoiced) = match self.state {
            IncidentFlowState::EnteringData {
                incident_type,
                invoiced,
            } => (incident_type, invoiced),
            _ => {
                return Err(IncidentError::InvalidFlowState {
                    current: self.state.name(),
                    expected: "ENTERING_DATA",
                })
            }
        };

        let mut incident = Incident::new(
            Uuid::new_v4().to_string(),
            incident_type,
            input.code,
            input.quantity,
            now,
        );
        if let Some(expected) = input.expected_code {
            incident = incident.with_expected_code(expected);
        }
        if let Some(notes) = input.notes {
            incident = incident.with_notes(notes);
        }
        if let Some(invoiced) = invoiced {
            incident = incident.with_invoiced(invoiced);
        }

        self.apply(&incident, ledger)?;
        self.state = IncidentFlowState::Idle;
        Ok(incident)
    }

    /// 应用一条异常记录(幂等: 同ID重复应用为空操作)
    ///
    /// 也用于从外部恢复的异常日志回放
    pub fn apply(
        &mut self,
        incident: &Incident,
        ledger: &mut QuantityLedger,
    ) -> Result<(), IncidentError> {
        if self.applied.contains(&incident.incident_id) {
            debug!(incident_id = %incident.incident_id, "异常已应用,跳过");
            return Ok(());
        }

        if let Some(reason_key) = incident.validate() {
            return Err(IncidentError::ValidationFailed { reason_key });
        }

        let unknown = || IncidentError::UnknownLine {
            code: incident.target_code().to_string(),
        };
        match incident.incident_type {
            IncidentType::Missing => {
                let idx = self.require_line(ledger, incident.target_code())?;
                ledger.apply_missing(idx, incident.quantity).ok_or_else(unknown)?;
            }
            IncidentType::Changed => {
                let idx = self.require_line(ledger, incident.target_code())?;
                ledger
                    .apply_changed(idx, &incident.code, incident.quantity)
                    .ok_or_else(unknown)?;
            }
            IncidentType::Return => {
                let idx = self.require_line(ledger, incident.target_code())?;
                ledger.apply_return(idx, incident.quantity).ok_or_else(unknown)?;
            }
            // 多货不动台账,纯审计
            IncidentType::Extra => {}
        }

        info!(
            incident_id = %incident.incident_id,
            incident_type = incident.incident_type.as_str(),
            code = %incident.code,
            quantity = incident.quantity,
            "异常已应用并记录"
        );
        self.applied.insert(incident.incident_id.clone());
        self.log.push(incident.clone());
        Ok(())
    }

    fn require_line(
        &self,
        ledger: &QuantityLedger,
        code: &str,
    ) -> Result<usize, IncidentError> {
        ledger
            .document()
            .find_by_code(code)
            .ok_or_else(|| IncidentError::UnknownLine {
                code: code.to_string(),
            })
    }
}
