// ==========================================
// 仓库扫描对账系统 - 领域类型定义
// ==========================================
// 职责: 定义对账引擎的策略/度量/作业类型枚举
// 红线: 策略是显式配置项,不允许散落在各画面硬编码
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 超量策略 (Overflow Policy)
// ==========================================
// 红线: 每单据一个策略,测试必须能确定性命中任一分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverflowPolicy {
    Strict,  // 严格: 超量扫描拒绝,台账不变
    Elastic, // 弹性: 超量扫描接受,应收数量随实际增长
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Strict => write!(f, "STRICT"),
            OverflowPolicy::Elastic => write!(f, "ELASTIC"),
        }
    }
}

impl OverflowPolicy {
    /// 从字符串解析策略
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ELASTIC" => OverflowPolicy::Elastic,
            _ => OverflowPolicy::Strict, // 默认严格
        }
    }

    /// 转换为配置存储的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::Strict => "STRICT",
            OverflowPolicy::Elastic => "ELASTIC",
        }
    }
}

// ==========================================
// 完成度量口径 (Requirement Measure)
// ==========================================
// 扫描驱动画面以 scanned 为准; 人工装箱画面以 packed 为准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementMeasure {
    Scanned, // 扫描确认数量
    Packed,  // 实际放置数量
}

impl fmt::Display for RequirementMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementMeasure::Scanned => write!(f, "SCANNED"),
            RequirementMeasure::Packed => write!(f, "PACKED"),
        }
    }
}

impl RequirementMeasure {
    /// 从字符串解析口径
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PACKED" => RequirementMeasure::Packed,
            _ => RequirementMeasure::Scanned, // 默认扫描口径
        }
    }

    /// 转换为配置存储的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementMeasure::Scanned => "SCANNED",
            RequirementMeasure::Packed => "PACKED",
        }
    }
}

// ==========================================
// 作业类型 (Workflow Kind)
// ==========================================
// 六个画面统一到一个引擎后,作业类型只决定配置档案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowKind {
    Receiving,       // 收货
    ManualReceiving, // 人工收货(先装箱后扫描确认)
    Counting,        // 实物盘点
    OrderPacking,    // 订单拣配装箱
    Transfer,        // 仓间调拨
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowKind::Receiving => write!(f, "RECEIVING"),
            WorkflowKind::ManualReceiving => write!(f, "MANUAL_RECEIVING"),
            WorkflowKind::Counting => write!(f, "COUNTING"),
            WorkflowKind::OrderPacking => write!(f, "ORDER_PACKING"),
            WorkflowKind::Transfer => write!(f, "TRANSFER"),
        }
    }
}

impl WorkflowKind {
    /// 从字符串解析作业类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RECEIVING" => Some(WorkflowKind::Receiving),
            "MANUAL_RECEIVING" => Some(WorkflowKind::ManualReceiving),
            "COUNTING" => Some(WorkflowKind::Counting),
            "ORDER_PACKING" => Some(WorkflowKind::OrderPacking),
            "TRANSFER" => Some(WorkflowKind::Transfer),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Receiving => "RECEIVING",
            WorkflowKind::ManualReceiving => "MANUAL_RECEIVING",
            WorkflowKind::Counting => "COUNTING",
            WorkflowKind::OrderPacking => "ORDER_PACKING",
            WorkflowKind::Transfer => "TRANSFER",
        }
    }

    /// 全部作业类型(用于配置档案遍历)
    pub fn all() -> [WorkflowKind; 5] {
        [
            WorkflowKind::Receiving,
            WorkflowKind::ManualReceiving,
            WorkflowKind::Counting,
            WorkflowKind::OrderPacking,
            WorkflowKind::Transfer,
        ]
    }
}

// ==========================================
// 异常事件类型 (Incident Type)
// ==========================================
// 异常直接作用于台账,绕过扫描匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
    Extra,   // 多货(仅审计,需开票确认)
    Changed, // 串货(到货品种与应收不符)
    Missing, // 短装(按实际到货数量核销)
    Return,  // 退回(已扫数量清零)
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentType::Extra => write!(f, "EXTRA"),
            IncidentType::Changed => write!(f, "CHANGED"),
            IncidentType::Missing => write!(f, "MISSING"),
            IncidentType::Return => write!(f, "RETURN"),
        }
    }
}

impl IncidentType {
    /// 从字符串解析异常类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EXTRA" => Some(IncidentType::Extra),
            "CHANGED" => Some(IncidentType::Changed),
            "MISSING" => Some(IncidentType::Missing),
            "RETURN" => Some(IncidentType::Return),
            _ => None,
        }
    }

    /// 转换为审计存储的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Extra => "EXTRA",
            IncidentType::Changed => "CHANGED",
            IncidentType::Missing => "MISSING",
            IncidentType::Return => "RETURN",
        }
    }

    /// 该类型是否允许数量为零(仅短装: 实际到货可为 0)
    pub fn allows_zero_quantity(&self) -> bool {
        matches!(self, IncidentType::Missing)
    }
}

// ==========================================
// 作业绩效等级 (Performance Tier)
// ==========================================
// 顺序: Excellent < Good < Normal < Slow (按秒/行阈值)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceTier {
    Excellent, // 优秀
    Good,      // 良好
    Normal,    // 正常
    Slow,      // 偏慢
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceTier::Excellent => write!(f, "EXCELLENT"),
            PerformanceTier::Good => write!(f, "GOOD"),
            PerformanceTier::Normal => write!(f, "NORMAL"),
            PerformanceTier::Slow => write!(f, "SLOW"),
        }
    }
}

impl PerformanceTier {
    /// 转换为展示用字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "EXCELLENT",
            PerformanceTier::Good => "GOOD",
            PerformanceTier::Normal => "NORMAL",
            PerformanceTier::Slow => "SLOW",
        }
    }
}
