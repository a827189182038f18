// ==========================================
// 仓库扫描对账系统 - 内存后端实现
// ==========================================
// 职责: WarehouseBackend 的进程内实现
// 用途: 集成测试与演示程序;可注入提交失败以验证重试路径
// ==========================================

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::traits::{
    ArticleInfo, ArticleQuery, DocumentRecord, WarehouseBackend,
};
use crate::domain::container::ContainerType;
use crate::domain::report::{ReconciliationReport, SubmissionReceipt};
use crate::engine::matcher::PackContent;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

// ==========================================
// InMemoryBackend
// ==========================================
#[derive(Default)]
pub struct InMemoryBackend {
    documents: Mutex<HashMap<String, DocumentRecord>>,
    pack_index: Mutex<HashMap<String, PackContent>>,
    container_types: Mutex<Vec<ContainerType>>,
    articles: Mutex<Vec<ArticleInfo>>,
    submissions: Mutex<Vec<ReconciliationReport>>,
    fail_next_submissions: AtomicU32, // 注入的剩余失败次数
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== 数据播种 =====

    pub fn insert_document(&self, record: DocumentRecord) {
        self.documents
            .lock()
            .unwrap()
            .insert(record.folio.clone(), record);
    }

    pub fn insert_pack(&self, inner_code: impl Into<String>, content: PackContent) {
        self.pack_index
            .lock()
            .unwrap()
            .insert(inner_code.into(), content);
    }

    pub fn add_container_type(&self, container_type: ContainerType) {
        self.container_types.lock().unwrap().push(container_type);
    }

    pub fn add_article(&self, article: ArticleInfo) {
        self.articles.lock().unwrap().push(article);
    }

    // ===== 故障注入 =====

    /// 让接下来 n 次提交失败(重试路径测试用)
    pub fn fail_next_submissions(&self, n: u32) {
        self.fail_next_submissions.store(n, Ordering::SeqCst);
    }

    /// 已受理的提交记录
    pub fn submissions(&self) -> Vec<ReconciliationReport> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarehouseBackend for InMemoryBackend {
    async fn fetch_document(&self, folio: &str) -> BackendResult<DocumentRecord> {
        self.documents
            .lock()
            .unwrap()
            .get(folio)
            .cloned()
            .ok_or_else(|| BackendError::DocumentNotFound {
                folio: folio.to_string(),
            })
    }

    async fn fetch_pack_index(&self) -> BackendResult<HashMap<String, PackContent>> {
        Ok(self.pack_index.lock().unwrap().clone())
    }

    async fn fetch_container_types(&self) -> BackendResult<Vec<ContainerType>> {
        Ok(self.container_types.lock().unwrap().clone())
    }

    async fn lookup_article(&self, query: &ArticleQuery) -> BackendResult<Vec<ArticleInfo>> {
        let articles = self.articles.lock().unwrap();
        let hits = match query {
            ArticleQuery::ByCode(code) => articles
                .iter()
                .filter(|a| a.code.eq_ignore_ascii_case(code))
                .cloned()
                .collect(),
            ArticleQuery::ByText(text) => {
                let needle = text.to_lowercase();
                articles
                    .iter()
                    .filter(|a| {
                        a.description
                            .as_deref()
                            .map(|d| d.to_lowercase().contains(&needle))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            }
        };
        Ok(hits)
    }

    async fn submit_reconciliation(
        &self,
        report: &ReconciliationReport,
    ) -> BackendResult<SubmissionReceipt> {
        // 故障注入: 剩余失败次数非零则本次失败
        let remaining = self.fail_next_submissions.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next_submissions
                .store(remaining - 1, Ordering::SeqCst);
            return Err(BackendError::Unavailable(
                "注入的提交失败".to_string(),
            ));
        }

        self.submissions.lock().unwrap().push(report.clone());
        Ok(SubmissionReceipt {
            submission_id: Uuid::new_v4().to_string(),
            accepted_at: Utc::now(),
        })
    }
}
