// ==========================================
// 仓库扫描对账系统 - 扫描会话 API
// ==========================================
// 职责: 面向画面的会话门面 - 装载/扫描/异常/定稿
// 说明: 引擎结果在此翻译为 DTO + i18n 提示文案
// 红线: 提交失败保留会话状态,重试不重扫
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::backend::traits::{ArticleInfo, ArticleQuery, WarehouseBackend};
use crate::config::ConfigManager;
use crate::domain::incident::Incident;
use crate::domain::line::Line;
use crate::domain::report::SubmissionReceipt;
use crate::domain::types::{IncidentType, PerformanceTier, WorkflowKind};
use crate::engine::events::OptionalEventPublisher;
use crate::engine::incident::IncidentInput;
use crate::engine::normalizer::SeparatorFoldingNormalizer;
use crate::engine::session::{ReconciliationSession, ScanOutcome};
use crate::engine::session_clock::rate_performance;
use crate::i18n::{t, t_with_args};
use crate::perf::PerfGuard;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// DTO
// ==========================================

/// 扫描结果状态(界面据此选提示音/样式)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanStatus {
    Accepted,
    OverflowRejected,
    NotFound,
    ContainerRequired,
    ContainerExpected,
    ContainerOpened,
    Ignored,
    AlreadyFinalized,
}

/// 明细行视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineView {
    pub code: String,
    pub description: Option<String>,
    pub required: u32,
    pub packed: u32,
    pub scanned: u32,
    pub note: Option<String>,
    pub complete: bool,
}

impl LineView {
    fn from_line(line: &Line, complete: bool) -> Self {
        Self {
            code: line.code.clone(),
            description: line.description.clone(),
            required: line.required,
            packed: line.packed,
            scanned: line.scanned,
            note: line.note.clone(),
            complete,
        }
    }
}

/// 一次扫描的应答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    pub status: ScanStatus,
    pub message: String,            // i18n 提示文案
    pub line: Option<LineView>,     // 事发行(行级结果才有)
    pub document_complete: bool,
}

/// 会话汇总视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub folio: String,
    pub workflow: WorkflowKind,
    pub lines: Vec<LineView>,
    pub complete: bool,
    pub measured_total: u32,
    pub effective_required_total: u32,
    pub container_count: usize,
    pub incident_count: usize,
    pub elapsed_seconds: i64,
}

/// 定稿结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeOutcome {
    pub receipt: SubmissionReceipt,
    pub elapsed_seconds: i64,
    pub performance: PerformanceTier,
    pub performance_caption: String, // i18n 评级文案
}

// ==========================================
// ScanSessionApi - 会话门面
// ==========================================
pub struct ScanSessionApi {
    backend: Arc<dyn WarehouseBackend>,
    session: ReconciliationSession,
}

impl std::fmt::Debug for ScanSessionApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSessionApi").finish_non_exhaustive()
    }
}

impl ScanSessionApi {
    /// 装载单据并创建会话
    ///
    /// 单据/内包装索引/容器类型三路并发拉取
    pub async fn open(
        backend: Arc<dyn WarehouseBackend>,
        folio: &str,
        manager: &ConfigManager,
    ) -> ApiResult<Self> {
        Self::open_with_events(backend, folio, manager, OptionalEventPublisher::none()).await
    }

    /// 装载单据并挂接反馈事件发布者
    pub async fn open_with_events(
        backend: Arc<dyn WarehouseBackend>,
        folio: &str,
        manager: &ConfigManager,
        events: OptionalEventPublisher,
    ) -> ApiResult<Self> {
        let _perf = PerfGuard::new("open_session");

        let (record, pack_index, container_types) = futures::try_join!(
            backend.fetch_document(folio),
            backend.fetch_pack_index(),
            backend.fetch_container_types()
        )?;

        let workflow = record.workflow;
        let config = manager.profile(workflow);
        let document = record.into_document(&SeparatorFoldingNormalizer);

        info!(
            folio,
            workflow = workflow.as_str(),
            lines = document.line_count(),
            "会话装载完成"
        );

        let session = ReconciliationSession::new(
            document,
            config,
            pack_index,
            container_types,
            manager.authorization_gate(),
        )
        .with_events(events);

        Ok(Self { backend, session })
    }

    // ==========================================
    // 扫描
    // ==========================================

    /// 处理一条扫描文本,返回界面应答
    pub fn scan(&mut self, raw: &str) -> ScanResponse {
        let outcome = self.session.process_scan(raw, Utc::now());
        self.translate(outcome)
    }

    fn translate(&self, outcome: ScanOutcome) -> ScanResponse {
        let document_complete = self.session.completion().is_complete();
        match outcome {
            ScanOutcome::Accepted {
                line_index,
                code,
                multiplier,
                document_complete,
                ..
            } => {
                let message = if document_complete {
                    t("scan.document_complete")
                } else {
                    t_with_args(
                        "scan.accepted",
                        &[("code", &code), ("qty", &multiplier.to_string())],
                    )
                };
                ScanResponse {
                    status: ScanStatus::Accepted,
                    message,
                    line: self.line_view(line_index),
                    document_complete,
                }
            }
            ScanOutcome::OverflowRejected {
                line_index,
                needed,
                attempted,
                ..
            } => ScanResponse {
                status: ScanStatus::OverflowRejected,
                message: t_with_args(
                    "scan.overflow",
                    &[
                        ("needed", &needed.to_string()),
                        ("attempted", &attempted.to_string()),
                    ],
                ),
                line: self.line_view(line_index),
                document_complete,
            },
            ScanOutcome::NotFound { code } => ScanResponse {
                status: ScanStatus::NotFound,
                message: t_with_args("scan.not_found", &[("code", &code)]),
                line: None,
                document_complete,
            },
            ScanOutcome::ContainerRequired { .. } => ScanResponse {
                status: ScanStatus::ContainerRequired,
                message: t("scan.container_required"),
                line: None,
                document_complete,
            },
            ScanOutcome::ContainerExpected { .. } => ScanResponse {
                status: ScanStatus::ContainerExpected,
                message: t("scan.container_expected"),
                line: None,
                document_complete,
            },
            ScanOutcome::ContainerOpened { seq_no, .. } => ScanResponse {
                status: ScanStatus::ContainerOpened,
                message: t_with_args("scan.container_opened", &[("seq", &seq_no.to_string())]),
                line: None,
                document_complete,
            },
            ScanOutcome::Ignored => ScanResponse {
                status: ScanStatus::Ignored,
                message: t("scan.ignored"),
                line: None,
                document_complete,
            },
            ScanOutcome::AlreadyFinalized => ScanResponse {
                status: ScanStatus::AlreadyFinalized,
                message: t("scan.finalized"),
                line: None,
                document_complete,
            },
        }
    }

    // ==========================================
    // 手工调整
    // ==========================================

    /// 放置数 +1
    pub fn increment(&mut self, line_index: usize) -> ApiResult<LineView> {
        self.session
            .increment(line_index, Utc::now())
            .ok_or_else(|| ApiError::NotFound(format!("行{}不存在", line_index)))?;
        self.require_line_view(line_index)
    }

    /// 放置数 -1
    pub fn decrement(&mut self, line_index: usize) -> ApiResult<LineView> {
        self.session
            .decrement(line_index, Utc::now())
            .ok_or_else(|| ApiError::NotFound(format!("行{}不存在", line_index)))?;
        self.require_line_view(line_index)
    }

    /// 放置数补满
    pub fn fill_to_required(&mut self, line_index: usize) -> ApiResult<LineView> {
        self.session
            .fill_to_required(line_index, Utc::now())
            .ok_or_else(|| ApiError::NotFound(format!("行{}不存在", line_index)))?;
        self.require_line_view(line_index)
    }

    // ==========================================
    // 未命中兜底 (外部目录)
    // ==========================================

    /// 查外部目录(未命中码的兜底路径)
    pub async fn lookup_article(&self, query: ArticleQuery) -> ApiResult<Vec<ArticleInfo>> {
        Ok(self.backend.lookup_article(&query).await?)
    }

    /// 手工补录一行
    pub fn add_manual_line(
        &mut self,
        code: &str,
        description: Option<String>,
        required: u32,
    ) -> ApiResult<usize> {
        self.session
            .add_manual_line(code, description, required)
            .ok_or_else(|| ApiError::InvalidInput(t("scan.manual_add_not_allowed")))
    }

    /// 移除明细行(仅盘点作业)
    pub fn remove_line(&mut self, line_index: usize) -> ApiResult<LineView> {
        let removed = self
            .session
            .remove_line(line_index)
            .ok_or_else(|| ApiError::InvalidInput(t("scan.line_removal_not_allowed")))?;
        Ok(LineView::from_line(&removed, false))
    }

    // ==========================================
    // 异常申报
    // ==========================================

    pub fn begin_incident(&mut self, incident_type: IncidentType) -> ApiResult<()> {
        Ok(self.session.begin_incident(incident_type)?)
    }

    pub fn confirm_incident_billing(&mut self, invoiced: bool) -> ApiResult<()> {
        Ok(self.session.confirm_incident_billing(invoiced)?)
    }

    pub fn authorize_incident(&mut self, password: &str) -> ApiResult<()> {
        Ok(self.session.authorize_incident(password)?)
    }

    pub fn submit_incident(&mut self, input: IncidentInput) -> ApiResult<Incident> {
        Ok(self.session.submit_incident(input, Utc::now())?)
    }

    pub fn cancel_incident(&mut self) {
        self.session.cancel_incident();
    }

    // ==========================================
    // 容器
    // ==========================================

    pub fn begin_add_container(&mut self) {
        self.session.begin_add_container();
    }

    pub fn cancel_add_container(&mut self) {
        self.session.cancel_add_container();
    }

    pub fn switch_container(&mut self, instance_id: &str) -> ApiResult<()> {
        if self.session.switch_container(instance_id, Utc::now()) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("容器{}不存在", instance_id)))
        }
    }

    // ==========================================
    // 定稿
    // ==========================================

    /// 定稿提交
    ///
    /// 完成校验 → 构建载荷 → 提交;失败保留状态,直接再次调用即重试
    pub async fn finalize(&mut self) -> ApiResult<FinalizeOutcome> {
        let _perf = PerfGuard::new("finalize_session");
        let now = Utc::now();

        let completion = self.session.completion();
        if !completion.is_complete() {
            let deficit = completion.effective_required_total as i64
                - completion.measured_total as i64;
            return Err(ApiError::IncompleteDocument { deficit });
        }

        let report = self.session.build_report(now);
        match self.backend.submit_reconciliation(&report).await {
            Ok(receipt) => {
                self.session.mark_submitted(now);
                let elapsed_seconds = self.session.clock().elapsed_seconds;
                let performance =
                    rate_performance(elapsed_seconds, self.session.document().line_count());
                info!(
                    folio = self.session.folio(),
                    elapsed_seconds,
                    performance = performance.as_str(),
                    "定稿提交成功"
                );
                Ok(FinalizeOutcome {
                    receipt,
                    elapsed_seconds,
                    performance,
                    performance_caption: t(match performance {
                        PerformanceTier::Excellent => "perf.excellent",
                        PerformanceTier::Good => "perf.good",
                        PerformanceTier::Normal => "perf.normal",
                        PerformanceTier::Slow => "perf.slow",
                    }),
                })
            }
            Err(err) => {
                warn!(folio = self.session.folio(), error = %err, "定稿提交失败,状态保留待重试");
                self.session.note_submission_failure(now);
                Err(err.into())
            }
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 会话汇总视图
    pub fn summary(&self) -> SessionSummary {
        let completion = self.session.completion();
        let document = self.session.document();
        SessionSummary {
            folio: document.header.folio.clone(),
            workflow: document.header.workflow,
            lines: document
                .lines
                .iter()
                .enumerate()
                .map(|(idx, line)| {
                    LineView::from_line(line, self.session.line_complete(idx))
                })
                .collect(),
            complete: completion.is_complete(),
            measured_total: completion.measured_total,
            effective_required_total: completion.effective_required_total,
            container_count: self.session.tracker().instances().len(),
            incident_count: self.session.incidents().len(),
            elapsed_seconds: self.session.clock().elapsed_at(Utc::now()),
        }
    }

    /// 底层会话只读访问(测试/高级画面用)
    pub fn session(&self) -> &ReconciliationSession {
        &self.session
    }

    fn line_view(&self, line_index: usize) -> Option<LineView> {
        self.session
            .document()
            .line(line_index)
            .map(|line| LineView::from_line(line, self.session.line_complete(line_index)))
    }

    fn require_line_view(&self, line_index: usize) -> ApiResult<LineView> {
        self.line_view(line_index)
            .ok_or_else(|| ApiError::NotFound(format!("行{}不存在", line_index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::backend::traits::{DocumentRecord, LineRecord};

    fn seeded_backend() -> Arc<InMemoryBackend> {
        let backend = InMemoryBackend::new();
        backend.insert_document(DocumentRecord {
            folio: "REC-001".to_string(),
            workflow: WorkflowKind::Transfer, // 调拨: 严格,无容器要求
            origin: None,
            destination: None,
            operator: Some("op01".to_string()),
            lines: vec![LineRecord {
                code: "A-100".to_string(),
                alternate_code: None,
                required: 2,
                unit: None,
                description: Some("样品物料".to_string()),
            }],
        });
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_open_scan_finalize() {
        let backend = seeded_backend();
        let manager = ConfigManager::builtin();
        let mut api = ScanSessionApi::open(backend.clone(), "REC-001", &manager)
            .await
            .unwrap();

        let response = api.scan("A'100");
        assert_eq!(response.status, ScanStatus::Accepted);
        assert!(!response.document_complete);

        let response = api.scan("A100");
        assert_eq!(response.status, ScanStatus::Accepted);
        assert!(response.document_complete);

        let outcome = api.finalize().await.unwrap();
        assert!(!outcome.receipt.submission_id.is_empty());
        assert_eq!(backend.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_finalize_incomplete_is_blocked() {
        let backend = seeded_backend();
        let manager = ConfigManager::builtin();
        let mut api = ScanSessionApi::open(backend, "REC-001", &manager)
            .await
            .unwrap();

        api.scan("A100");
        let err = api.finalize().await.unwrap_err();
        match err {
            ApiError::IncompleteDocument { deficit } => assert_eq!(deficit, 1),
            other => panic!("expected IncompleteDocument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_finalize_retry_after_failure() {
        let backend = seeded_backend();
        backend.fail_next_submissions(1);
        let manager = ConfigManager::builtin();
        let mut api = ScanSessionApi::open(backend.clone(), "REC-001", &manager)
            .await
            .unwrap();

        api.scan("A100");
        api.scan("A100");

        // 第一次提交失败: 状态保留
        let err = api.finalize().await.unwrap_err();
        assert!(matches!(err, ApiError::SubmissionFailure(_)));
        assert!(!api.session().is_finalized());
        assert_eq!(api.summary().measured_total, 2);

        // 直接重试成功,无需重扫
        let outcome = api.finalize().await.unwrap();
        assert!(outcome.elapsed_seconds >= 0);
        assert_eq!(backend.submissions().len(), 1);
        assert_eq!(backend.submissions()[0].total_scanned(), 2);
    }

    #[tokio::test]
    async fn test_open_unknown_folio() {
        let backend = seeded_backend();
        let manager = ConfigManager::builtin();
        let err = ScanSessionApi::open(backend, "NOPE", &manager)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
