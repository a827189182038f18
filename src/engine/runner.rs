// ==========================================
// 仓库扫描对账系统 - 扫描输入通道
// ==========================================
// 职责: 把扫描枪建模为通道上的消息生产者,与界面焦点彻底解耦
// 说明: 扫描枪输出完整码 + 结束符,此处收到的已是离散文本事件
// 红线: 单据单逻辑执行者 - 通道消费端顺序处理,无并发变更
// ==========================================

use crate::engine::session::{ReconciliationSession, ScanOutcome};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::debug;

// ==========================================
// ScanMessage - 一条扫描消息
// ==========================================
#[derive(Debug, Clone)]
pub struct ScanMessage {
    pub raw: String,            // 原始扫描文本
    pub at: DateTime<Utc>,      // 扫描时间
}

impl ScanMessage {
    pub fn new(raw: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            raw: raw.into(),
            at,
        }
    }
}

/// 创建扫描通道(生产端交给扫描枪适配层)
pub fn scan_channel(buffer: usize) -> (mpsc::Sender<ScanMessage>, mpsc::Receiver<ScanMessage>) {
    mpsc::channel(buffer)
}

/// 顺序消费扫描通道,逐条喂给会话
///
/// 通道关闭后返回全部处理结果(反馈事件已实时经发布者发出,
/// 返回值主要供调用方/测试复盘)
pub async fn run_scan_feed(
    session: &mut ReconciliationSession,
    mut rx: mpsc::Receiver<ScanMessage>,
) -> Vec<ScanOutcome> {
    let mut outcomes = Vec::new();
    while let Some(message) = rx.recv().await {
        debug!(raw = %message.raw, "扫描消息入引擎");
        outcomes.push(session.process_scan(&message.raw, message.at));
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconciliationConfig;
    use crate::domain::line::{Document, DocumentHeader, Line};
    use crate::domain::types::WorkflowKind;
    use crate::engine::incident::DenyAllGate;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn session() -> ReconciliationSession {
        let header = DocumentHeader::new("REC-001", WorkflowKind::Receiving);
        let document = Document::new(header, vec![Line::new("A100", 2)]);
        ReconciliationSession::new(
            document,
            ReconciliationConfig::strict(),
            HashMap::new(),
            vec![],
            Arc::new(DenyAllGate),
        )
    }

    #[tokio::test]
    async fn test_feed_drains_in_order() {
        let (tx, rx) = scan_channel(16);
        let mut s = session();

        let now = Utc::now();
        for raw in ["A100", "A100", "A100"] {
            tx.send(ScanMessage::new(raw, now)).await.unwrap();
        }
        drop(tx); // 关闭通道结束消费

        let outcomes = run_scan_feed(&mut s, rx).await;
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], ScanOutcome::Accepted { .. }));
        assert!(matches!(outcomes[1], ScanOutcome::Accepted { .. }));
        // 第三条超量拒绝
        assert!(matches!(outcomes[2], ScanOutcome::OverflowRejected { .. }));
        assert_eq!(s.document().lines[0].scanned, 2);
    }

    #[tokio::test]
    async fn test_feed_survives_noise_input() {
        let (tx, rx) = scan_channel(4);
        let mut s = session();

        tx.send(ScanMessage::new("---", Utc::now())).await.unwrap();
        tx.send(ScanMessage::new("ZZZ", Utc::now())).await.unwrap();
        drop(tx);

        let outcomes = run_scan_feed(&mut s, rx).await;
        assert_eq!(outcomes[0], ScanOutcome::Ignored);
        assert!(matches!(outcomes[1], ScanOutcome::NotFound { .. }));
    }
}
