// ==========================================
// 仓库扫描对账系统 - 引擎层反馈事件
// ==========================================
// 职责: 定义扫描反馈事件发布 trait,实现依赖倒置
// 说明: Engine 层定义 trait,UI 层实现适配器(提示音/浮层/高亮)
// 优势: Engine 不依赖任何界面技术栈
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 扫描反馈事件类型
// ==========================================

/// 扫描反馈事件类型
///
/// Engine 层定义的事件类型,UI 层据此决定提示音与浮层样式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanEventType {
    /// 扫描接受
    LineAccepted,
    /// 严格策略超量拒绝
    OverflowRejected,
    /// 码未命中
    CodeNotFound,
    /// 需要先扫容器
    ContainerRequired,
    /// 开新容器
    ContainerOpened,
    /// 切换活动容器
    ContainerSwitched,
    /// 异常已记录
    IncidentRecorded,
    /// 单行完成
    LineCompleted,
    /// 整单完成
    DocumentCompleted,
    /// 提交失败(可重试)
    SubmissionFailed,
    /// 提交成功
    SubmissionSucceeded,
}

impl ScanEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            ScanEventType::LineAccepted => "LineAccepted",
            ScanEventType::OverflowRejected => "OverflowRejected",
            ScanEventType::CodeNotFound => "CodeNotFound",
            ScanEventType::ContainerRequired => "ContainerRequired",
            ScanEventType::ContainerOpened => "ContainerOpened",
            ScanEventType::ContainerSwitched => "ContainerSwitched",
            ScanEventType::IncidentRecorded => "IncidentRecorded",
            ScanEventType::LineCompleted => "LineCompleted",
            ScanEventType::DocumentCompleted => "DocumentCompleted",
            ScanEventType::SubmissionFailed => "SubmissionFailed",
            ScanEventType::SubmissionSucceeded => "SubmissionSucceeded",
        }
    }
}

/// 扫描反馈事件
///
/// Engine 层发布的事件,带单据号与事发行信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// 单据号
    pub folio: String,
    /// 事件类型
    pub event_type: ScanEventType,
    /// 事发行物料码(整单级事件为 None)
    pub line_code: Option<String>,
    /// 附带数量(接受件数/缺口等,语义随事件类型)
    pub quantity: Option<u32>,
    /// 事发时间
    pub occurred_at: DateTime<Utc>,
}

impl ScanEvent {
    /// 创建整单级事件
    pub fn document(folio: impl Into<String>, event_type: ScanEventType, at: DateTime<Utc>) -> Self {
        Self {
            folio: folio.into(),
            event_type,
            line_code: None,
            quantity: None,
            occurred_at: at,
        }
    }

    /// 创建行级事件
    pub fn line(
        folio: impl Into<String>,
        event_type: ScanEventType,
        line_code: impl Into<String>,
        quantity: Option<u32>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            folio: folio.into(),
            event_type,
            line_code: Some(line_code.into()),
            quantity,
            occurred_at: at,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 扫描反馈事件发布者 Trait
///
/// Engine 层定义,UI 层实现
/// 通过 trait 实现依赖倒置,解除 Engine → UI 的直接依赖
pub trait ScanEventPublisher: Send + Sync {
    /// 发布扫描反馈事件
    ///
    /// # 返回
    /// - `Ok(())`: 发布成功
    /// - `Err`: 发布失败(引擎忽略失败,反馈是尽力而为)
    fn publish(&self, event: ScanEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要反馈的场景(如单元测试)
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl ScanEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: ScanEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - folio={}, event_type={}",
            event.folio,
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn ScanEventPublisher>> 的使用
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn ScanEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn ScanEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例(不发布事件)
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件(如果有发布者);发布失败仅记日志
    pub fn publish(&self, event: ScanEvent) {
        if let Some(publisher) = &self.inner {
            if let Err(e) = publisher.publish(event) {
                tracing::warn!("反馈事件发布失败: {}", e);
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
