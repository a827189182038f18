// ==========================================
// 仓库扫描对账系统 - 后端协作方接口
// ==========================================
// 职责: 定义引擎消费的外部契约(拉取/目录/提交)
// 说明: 不约定线格式,任何满足契约的 JSON/REST 形态皆可
// 红线: 提交调用在引擎事务边界之外,失败不得污染会话状态
// ==========================================

use crate::backend::error::BackendResult;
use crate::domain::container::ContainerType;
use crate::domain::line::{Document, DocumentHeader, Line};
use crate::domain::report::{ReconciliationReport, SubmissionReceipt};
use crate::domain::types::WorkflowKind;
use crate::engine::matcher::PackContent;
use crate::engine::normalizer::CodeNormalizer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// LineRecord - 后端明细行记录
// ==========================================
// 后端原始形态,码未归一化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRecord {
    pub code: String,                   // 物料码(后端原始形态)
    pub alternate_code: Option<String>, // 备用条码
    pub required: u32,                  // 应收数量
    pub unit: Option<String>,           // 计量单位
    pub description: Option<String>,    // 品名
}

// ==========================================
// DocumentRecord - 后端单据记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub folio: String,
    pub workflow: WorkflowKind,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub operator: Option<String>,
    pub lines: Vec<LineRecord>,
}

impl DocumentRecord {
    /// 转为领域单据,码在此处统一归一化
    ///
    /// 引擎只接受规范码,归一化是进入引擎前的最后一道工序
    pub fn into_document(self, normalizer: &dyn CodeNormalizer) -> Document {
        let mut header = DocumentHeader::new(self.folio, self.workflow);
        header.origin = self.origin;
        header.destination = self.destination;
        header.operator = self.operator;

        let lines = self
            .lines
            .into_iter()
            .map(|record| {
                let mut line = Line::new(normalizer.normalize(&record.code), record.required);
                line.alternate_code = record
                    .alternate_code
                    .map(|alt| normalizer.normalize(&alt))
                    .filter(|alt| !alt.is_empty());
                line.unit = record.unit;
                line.description = record.description;
                line
            })
            .collect();

        Document::new(header, lines)
    }
}

// ==========================================
// ArticleQuery / ArticleInfo - 目录兜底查询
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArticleQuery {
    /// 按码精确查询
    ByCode(String),
    /// 按品名模糊查询
    ByText(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleInfo {
    pub code: String,
    pub description: Option<String>,
    pub unit: Option<String>,
}

// ==========================================
// WarehouseBackend - 后端协作方 Trait
// ==========================================

/// 后端协作方接口
///
/// # 契约
/// - `fetch_document`: 按单据号取有序明细行
/// - `fetch_pack_index`: 内包装码 → (物料码, 倍数) 索引
/// - `fetch_container_types`: 容器类型表
/// - `lookup_article`: 目录查询(仅手工补录兜底使用,不参与核心匹配)
/// - `submit_reconciliation`: 定稿提交;必须可重试,重复数据由回执幂等
#[async_trait]
pub trait WarehouseBackend: Send + Sync {
    async fn fetch_document(&self, folio: &str) -> BackendResult<DocumentRecord>;

    async fn fetch_pack_index(&self) -> BackendResult<HashMap<String, PackContent>>;

    async fn fetch_container_types(&self) -> BackendResult<Vec<ContainerType>>;

    async fn lookup_article(&self, query: &ArticleQuery) -> BackendResult<Vec<ArticleInfo>>;

    async fn submit_reconciliation(
        &self,
        report: &ReconciliationReport,
    ) -> BackendResult<SubmissionReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::normalizer::SeparatorFoldingNormalizer;

    #[test]
    fn test_into_document_normalizes_codes() {
        let record = DocumentRecord {
            folio: "REC-001".to_string(),
            workflow: WorkflowKind::Receiving,
            origin: Some("供应商A".to_string()),
            destination: None,
            operator: Some("op01".to_string()),
            lines: vec![LineRecord {
                code: "a-100".to_string(),
                alternate_code: Some("75'01001".to_string()),
                required: 3,
                unit: Some("PZ".to_string()),
                description: None,
            }],
        };

        let document = record.into_document(&SeparatorFoldingNormalizer);
        assert_eq!(document.lines[0].code, "A100");
        assert_eq!(document.lines[0].alternate_code.as_deref(), Some("7501001"));
        assert_eq!(document.header.operator.as_deref(), Some("op01"));
    }

    #[test]
    fn test_into_document_drops_empty_alternate() {
        let record = DocumentRecord {
            folio: "REC-002".to_string(),
            workflow: WorkflowKind::Receiving,
            origin: None,
            destination: None,
            operator: None,
            lines: vec![LineRecord {
                code: "B200".to_string(),
                alternate_code: Some("--".to_string()), // 归一化后为空
                required: 1,
                unit: None,
                description: None,
            }],
        };

        let document = record.into_document(&SeparatorFoldingNormalizer);
        assert!(document.lines[0].alternate_code.is_none());
    }
}
