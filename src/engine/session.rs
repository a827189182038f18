// ==========================================
// 仓库扫描对账系统 - 对账会话引擎
// ==========================================
// 职责: 编排匹配/台账/容器/异常/计时五个引擎,对外一个扫描入口
// 说明: 六个画面的差异收敛为一份 ReconciliationConfig
// 红线: 单据单逻辑执行者,所有变更顺序处理;提交失败不失效内部状态
// ==========================================

use crate::config::ReconciliationConfig;
use crate::domain::container::ContainerType;
use crate::domain::incident::Incident;
use crate::domain::line::{Document, Line};
use crate::domain::report::{LineResult, ReconciliationReport};
use crate::domain::types::IncidentType;
use crate::engine::completion::{
    CompletionAdjustments, CompletionDetector, DocumentCompletion,
};
use crate::engine::container_tracker::ContainerTracker;
use crate::engine::events::{OptionalEventPublisher, ScanEvent, ScanEventType};
use crate::engine::incident::{
    AuthorizationGate, IncidentError, IncidentInput, IncidentProcessor,
};
use crate::engine::ledger::{ManualAdjust, QuantityLedger, ScanApply};
use crate::engine::matcher::{PackContent, ScanMatcher};
use crate::engine::normalizer::{CodeNormalizer, SeparatorFoldingNormalizer};
use crate::engine::session_clock::SessionClock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// ScanOutcome - 一次扫描的处理结果
// ==========================================
// 拒绝/未命中都是正常控制流,不走错误通道
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// 接受: 台账已更新
    Accepted {
        line_index: usize,
        code: String,
        multiplier: u32,
        scanned: u32,
        packed: u32,
        required: u32,
        grew_required: bool,
        line_complete: bool,
        document_complete: bool,
    },
    /// 严格策略超量拒绝(台账不变)
    OverflowRejected {
        line_index: usize,
        code: String,
        needed: u32,
        attempted: u32,
    },
    /// 未命中任何行/内包装(可走手工补录兜底)
    NotFound { code: String },
    /// 本作业要求先扫容器
    ContainerRequired { code: String },
    /// "再加一箱"子模式下只接受容器码
    ContainerExpected { code: String },
    /// 开新容器成功
    ContainerOpened {
        instance_id: String,
        type_code: String,
        seq_no: u32,
    },
    /// 归一化后为空,忽略
    Ignored,
    /// 单据已定稿,不再接受扫描
    AlreadyFinalized,
}

// ==========================================
// ReconciliationSession - 对账会话
// ==========================================
pub struct ReconciliationSession {
    folio: String,
    config: ReconciliationConfig,
    ledger: QuantityLedger,
    matcher: ScanMatcher,
    tracker: ContainerTracker,
    incidents: IncidentProcessor,
    clock: SessionClock,
    events: OptionalEventPublisher,
    normalizer: Box<dyn CodeNormalizer>,
    finalized: bool,
}

impl ReconciliationSession {
    /// 创建对账会话
    ///
    /// # 参数
    /// - document: 已装载的单据(行码要求已归一化)
    /// - config: 作业对账配置
    /// - pack_index: 内包装索引(后端拉取)
    /// - container_types: 容器类型表(后端拉取)
    /// - gate: 多货开票授权门
    pub fn new(
        document: Document,
        config: ReconciliationConfig,
        pack_index: HashMap<String, PackContent>,
        container_types: Vec<ContainerType>,
        gate: Arc<dyn AuthorizationGate>,
    ) -> Self {
        let folio = document.header.folio.clone();
        let matcher = ScanMatcher::new(&document, pack_index);
        info!(
            folio = %folio,
            workflow = document.header.workflow.as_str(),
            lines = document.line_count(),
            policy = config.overflow_policy.as_str(),
            measure = config.requirement_measure.as_str(),
            "对账会话已创建"
        );
        Self {
            folio,
            config,
            ledger: QuantityLedger::new(document),
            matcher,
            tracker: ContainerTracker::new(container_types),
            incidents: IncidentProcessor::new(gate),
            clock: SessionClock::new(),
            events: OptionalEventPublisher::none(),
            normalizer: Box::new(SeparatorFoldingNormalizer),
            finalized: false,
        }
    }

    /// 挂接反馈事件发布者
    pub fn with_events(mut self, events: OptionalEventPublisher) -> Self {
        self.events = events;
        self
    }

    /// 替换归一化策略(按仓库/枪型)
    pub fn with_normalizer(mut self, normalizer: Box<dyn CodeNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    // ==========================================
    // 扫描入口
    // ==========================================

    /// 处理一条扫描文本
    ///
    /// 路由顺序:
    /// 1. 归一化(空码忽略)
    /// 2. "再加一箱"子模式: 只接受容器码
    /// 3. 容器码: 开新容器并设为活动容器
    /// 4. 要求容器但未开箱: 拒绝物料扫描
    /// 5. 匹配 → 台账 → 容器归属 → 完成判定
    pub fn process_scan(&mut self, raw: &str, now: DateTime<Utc>) -> ScanOutcome {
        if self.finalized {
            warn!(folio = %self.folio, "单据已定稿,扫描被忽略");
            return ScanOutcome::AlreadyFinalized;
        }

        let code = self.normalizer.normalize(raw);
        if code.is_empty() {
            return ScanOutcome::Ignored;
        }

        // "再加一箱"子模式: 只认容器码
        if self.tracker.is_adding() && !self.tracker.is_container_code(&code) {
            self.publish(ScanEvent::line(
                &self.folio,
                ScanEventType::ContainerRequired,
                &code,
                None,
                now,
            ));
            return ScanOutcome::ContainerExpected { code };
        }

        // 容器码: 开箱
        if self.tracker.is_container_code(&code) {
            // open 只会对已知类型返回 Some,此处已判定
            if let Some(instance) = self.tracker.open(&code, now) {
                let outcome = ScanOutcome::ContainerOpened {
                    instance_id: instance.instance_id.clone(),
                    type_code: instance.type_code.clone(),
                    seq_no: instance.seq_no,
                };
                self.publish(ScanEvent::line(
                    &self.folio,
                    ScanEventType::ContainerOpened,
                    &code,
                    None,
                    now,
                ));
                return outcome;
            }
        }

        // 要求容器的作业: 未开箱前拒绝物料扫描
        if self.config.require_container && !self.tracker.has_active() {
            self.publish(ScanEvent::line(
                &self.folio,
                ScanEventType::ContainerRequired,
                &code,
                None,
                now,
            ));
            return ScanOutcome::ContainerRequired { code };
        }

        // 匹配
        let (line_index, multiplier) = match self.matcher.resolve(&code) {
            Some(hit) => hit,
            None => {
                debug!(folio = %self.folio, code = %code, "扫描未命中");
                self.publish(ScanEvent::line(
                    &self.folio,
                    ScanEventType::CodeNotFound,
                    &code,
                    None,
                    now,
                ));
                return ScanOutcome::NotFound { code };
            }
        };

        let was_line_complete = self.line_complete(line_index);

        // 台账应用(下标来自匹配器,必然有效)
        let apply = match self.ledger.apply_scan(
            line_index,
            multiplier,
            self.config.overflow_policy,
            self.config.requirement_measure,
        ) {
            Some(apply) => apply,
            None => return ScanOutcome::NotFound { code },
        };

        match apply {
            ScanApply::Overflow {
                needed, attempted, ..
            } => {
                self.publish(ScanEvent::line(
                    &self.folio,
                    ScanEventType::OverflowRejected,
                    &code,
                    Some(needed),
                    now,
                ));
                ScanOutcome::OverflowRejected {
                    line_index,
                    code,
                    needed,
                    attempted,
                }
            }
            ScanApply::Accepted {
                scanned,
                packed,
                required,
                grew_required,
                ..
            } => {
                // 行主码用于容器清单(扫的可能是备用条码/内包装)
                let line_code = self
                    .ledger
                    .line(line_index)
                    .map(|l| l.code.clone())
                    .unwrap_or_else(|| code.clone());
                self.tracker.record_scan(&line_code, multiplier);
                self.touch_clock(now);

                self.publish(ScanEvent::line(
                    &self.folio,
                    ScanEventType::LineAccepted,
                    &line_code,
                    Some(multiplier),
                    now,
                ));

                let line_complete = self.line_complete(line_index);
                if line_complete && !was_line_complete {
                    self.publish(ScanEvent::line(
                        &self.folio,
                        ScanEventType::LineCompleted,
                        &line_code,
                        None,
                        now,
                    ));
                }
                let completion = self.completion();
                if completion.is_complete() {
                    self.publish(ScanEvent::document(
                        &self.folio,
                        ScanEventType::DocumentCompleted,
                        now,
                    ));
                }

                ScanOutcome::Accepted {
                    line_index,
                    code: line_code,
                    multiplier,
                    scanned,
                    packed,
                    required,
                    grew_required,
                    line_complete,
                    document_complete: completion.is_complete(),
                }
            }
        }
    }

    // ==========================================
    // 手工调整
    // ==========================================

    /// 放置数 +1
    pub fn increment(&mut self, line_index: usize, now: DateTime<Utc>) -> Option<ManualAdjust> {
        let adj = self.ledger.increment(line_index)?;
        self.after_manual_adjust(line_index, now);
        Some(adj)
    }

    /// 放置数 -1(扫描数同步压到不高于放置数)
    pub fn decrement(&mut self, line_index: usize, now: DateTime<Utc>) -> Option<ManualAdjust> {
        let adj = self.ledger.decrement(line_index)?;
        self.after_manual_adjust(line_index, now);
        Some(adj)
    }

    /// 放置数补满到应收
    pub fn fill_to_required(
        &mut self,
        line_index: usize,
        now: DateTime<Utc>,
    ) -> Option<ManualAdjust> {
        let adj = self.ledger.fill_to_required(line_index)?;
        self.after_manual_adjust(line_index, now);
        Some(adj)
    }

    fn after_manual_adjust(&mut self, line_index: usize, now: DateTime<Utc>) {
        self.touch_clock(now);
        if self.line_complete(line_index) {
            if let Some(line) = self.ledger.line(line_index) {
                let code = line.code.clone();
                self.publish(ScanEvent::line(
                    &self.folio,
                    ScanEventType::LineCompleted,
                    code,
                    None,
                    now,
                ));
            }
        }
        if self.completion().is_complete() {
            self.publish(ScanEvent::document(
                &self.folio,
                ScanEventType::DocumentCompleted,
                now,
            ));
        }
    }

    // ==========================================
    // 行增删 (手工补录兜底 / 盘点删行)
    // ==========================================

    /// 手工补录一行(外部目录兜底路径)
    ///
    /// 码已存在时返回已有行下标;配置不允许时返回 None
    pub fn add_manual_line(
        &mut self,
        raw_code: &str,
        description: Option<String>,
        required: u32,
    ) -> Option<usize> {
        if !self.config.allow_manual_add {
            return None;
        }
        let code = self.normalizer.normalize(raw_code);
        if code.is_empty() {
            return None;
        }
        if let Some(existing) = self.ledger.document().find_by_code(&code) {
            return Some(existing);
        }

        let mut line = Line::new(code, required).manual();
        line.description = description;
        let index = self.ledger.document_mut().push_line(line);
        self.matcher.rebuild(self.ledger.document());
        info!(folio = %self.folio, line_index = index, "手工补录行已追加");
        Some(index)
    }

    /// 移除明细行(仅盘点作业配置允许)
    pub fn remove_line(&mut self, line_index: usize) -> Option<Line> {
        if !self.config.allow_line_removal {
            return None;
        }
        let removed = self.ledger.document_mut().remove_line(line_index)?;
        self.matcher.rebuild(self.ledger.document());
        info!(folio = %self.folio, code = %removed.code, "明细行已移除");
        Some(removed)
    }

    // ==========================================
    // 容器操作
    // ==========================================

    /// 进入"再加一箱"子模式
    pub fn begin_add_container(&mut self) {
        self.tracker.begin_add_mode();
    }

    /// 退出"再加一箱"子模式
    pub fn cancel_add_container(&mut self) {
        self.tracker.cancel_add_mode();
    }

    /// 切换活动容器
    pub fn switch_container(&mut self, instance_id: &str, now: DateTime<Utc>) -> bool {
        let switched = self.tracker.switch_active(instance_id);
        if switched {
            self.publish(ScanEvent::document(
                &self.folio,
                ScanEventType::ContainerSwitched,
                now,
            ));
        }
        switched
    }

    // ==========================================
    // 异常申报流程 (透传异常处理器)
    // ==========================================

    /// 选择异常类型
    pub fn begin_incident(&mut self, incident_type: IncidentType) -> Result<(), IncidentError> {
        self.incidents.begin(incident_type)
    }

    /// 多货开票确认
    pub fn confirm_incident_billing(&mut self, invoiced: bool) -> Result<(), IncidentError> {
        self.incidents.confirm_billing(invoiced)
    }

    /// 多货口令授权
    pub fn authorize_incident(&mut self, password: &str) -> Result<(), IncidentError> {
        self.incidents.authorize(password)
    }

    /// 提交异常录入
    pub fn submit_incident(
        &mut self,
        mut input: IncidentInput,
        now: DateTime<Utc>,
    ) -> Result<Incident, IncidentError> {
        // 录入码同样过归一化,与扫描同一口径
        input.code = self.normalizer.normalize(&input.code);
        input.expected_code = input
            .expected_code
            .map(|e| self.normalizer.normalize(&e));

        let incident = self.incidents.submit(input, &mut self.ledger, now)?;
        self.touch_clock(now);
        self.publish(ScanEvent::line(
            &self.folio,
            ScanEventType::IncidentRecorded,
            incident.target_code(),
            Some(incident.quantity),
            now,
        ));
        if self.completion().is_complete() {
            self.publish(ScanEvent::document(
                &self.folio,
                ScanEventType::DocumentCompleted,
                now,
            ));
        }
        Ok(incident)
    }

    /// 放弃当前异常申报
    pub fn cancel_incident(&mut self) {
        self.incidents.cancel();
    }

    // ==========================================
    // 完成判定与定稿
    // ==========================================

    /// 当前整单完成判定
    pub fn completion(&self) -> DocumentCompletion {
        let adjustments = CompletionAdjustments::from_incidents(self.incidents.incidents());
        CompletionDetector::document_complete(
            self.ledger.document(),
            self.config.requirement_measure,
            &adjustments,
        )
    }

    /// 单行完成判定
    pub fn line_complete(&self, line_index: usize) -> bool {
        let adjustments = CompletionAdjustments::from_incidents(self.incidents.incidents());
        match self.ledger.line(line_index) {
            Some(line) => CompletionDetector::line_complete(
                line,
                self.config.requirement_measure,
                &adjustments,
            ),
            None => false,
        }
    }

    /// 构建提交载荷(纯函数,可反复构建用于重试)
    pub fn build_report(&self, now: DateTime<Utc>) -> ReconciliationReport {
        let document = self.ledger.document();
        ReconciliationReport {
            folio: self.folio.clone(),
            workflow: document.header.workflow,
            operator: document.header.operator.clone(),
            lines: document
                .lines
                .iter()
                .map(|l| LineResult {
                    code: l.code.clone(),
                    required: l.required,
                    packed: l.packed,
                    scanned: l.scanned,
                    note: l.note.clone(),
                    manual_added: l.manual_added,
                })
                .collect(),
            incidents: self.incidents.incidents().to_vec(),
            containers: self.tracker.instances().to_vec(),
            elapsed_seconds: self.clock.elapsed_at(now),
            built_at: now,
        }
    }

    /// 提交成功回调: 冻结计时,封闭会话
    pub fn mark_submitted(&mut self, now: DateTime<Utc>) {
        self.clock.freeze(now);
        self.finalized = true;
        self.publish(ScanEvent::document(
            &self.folio,
            ScanEventType::SubmissionSucceeded,
            now,
        ));
        info!(
            folio = %self.folio,
            elapsed_seconds = self.clock.elapsed_seconds,
            "单据已定稿"
        );
    }

    /// 提交失败回调: 状态保持,可重试
    pub fn note_submission_failure(&mut self, now: DateTime<Utc>) {
        self.publish(ScanEvent::document(
            &self.folio,
            ScanEventType::SubmissionFailed,
            now,
        ));
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn folio(&self) -> &str {
        &self.folio
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        self.ledger.document()
    }

    pub fn incidents(&self) -> &[Incident] {
        self.incidents.incidents()
    }

    pub fn tracker(&self) -> &ContainerTracker {
        &self.tracker
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // ==========================================
    // 内部工具
    // ==========================================

    fn touch_clock(&mut self, now: DateTime<Utc>) {
        let (measured, _) = self.ledger.totals(self.config.requirement_measure);
        let (scanned, _) = self
            .ledger
            .totals(crate::domain::types::RequirementMeasure::Scanned);
        self.clock.on_mutation(measured > 0 || scanned > 0, now);
    }

    fn publish(&self, event: ScanEvent) {
        self.events.publish(event);
    }
}
