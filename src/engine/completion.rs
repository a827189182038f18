// ==========================================
// 仓库扫描对账系统 - 完成判定引擎
// ==========================================
// 职责: 每次台账变更后判定单行/整单完成
// 红线: 整单完成要求逐行完成 + 合计相等双重校验
// (弹性抬升可能让逐行为真而全局漂移,两个口径都要过)
// ==========================================

use crate::domain::incident::Incident;
use crate::domain::line::{Document, Line};
use crate::domain::types::{IncidentType, RequirementMeasure};
use std::collections::HashMap;

// ==========================================
// CompletionAdjustments - 异常对完成口径的调整
// ==========================================
// 短装把有效应收钉在申报数量;退回把退回件数从有效应收中剔除
#[derive(Debug, Clone, Default)]
pub struct CompletionAdjustments {
    entries: HashMap<String, LineAdjustment>,
}

#[derive(Debug, Clone, Copy, Default)]
struct LineAdjustment {
    pinned_required: Option<u32>, // MISSING: 有效应收钉死在实际到货数
    returned: u32,                // RETURN: 累计退回件数
}

impl CompletionAdjustments {
    /// 从异常日志构建调整表
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        let mut adj = Self::default();
        for incident in incidents {
            let entry = adj
                .entries
                .entry(incident.target_code().to_string())
                .or_default();
            match incident.incident_type {
                IncidentType::Missing => entry.pinned_required = Some(incident.quantity),
                IncidentType::Return => entry.returned += incident.quantity,
                // EXTRA 纯审计,CHANGED 的核销已直接写入台账
                IncidentType::Extra | IncidentType::Changed => {}
            }
        }
        adj
    }

    /// 某行的有效应收数量
    pub fn effective_required(&self, line: &Line) -> u32 {
        match self.entries.get(&line.code) {
            Some(entry) => entry
                .pinned_required
                .unwrap_or(line.required)
                .saturating_sub(entry.returned),
            None => line.required,
        }
    }
}

// ==========================================
// DocumentCompletion - 整单判定结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentCompletion {
    pub all_lines_complete: bool, // 逐行完成
    pub sums_match: bool,         // 口径合计 == 有效应收合计
    pub measured_total: u32,
    pub effective_required_total: u32,
}

impl DocumentCompletion {
    /// 整单是否完成(两个校验都过)
    pub fn is_complete(&self) -> bool {
        self.all_lines_complete && self.sums_match
    }
}

// ==========================================
// CompletionDetector - 完成判定引擎
// ==========================================
// 纯函数集合,无状态
pub struct CompletionDetector;

impl CompletionDetector {
    /// 单行完成判定
    ///
    /// 完成 ⇔ 有效应收为 0,或口径计数 ≥ 有效应收
    pub fn line_complete(
        line: &Line,
        measure: RequirementMeasure,
        adjustments: &CompletionAdjustments,
    ) -> bool {
        let effective = adjustments.effective_required(line);
        effective == 0 || line.measure_qty(measure) >= effective
    }

    /// 整单完成判定
    pub fn document_complete(
        document: &Document,
        measure: RequirementMeasure,
        adjustments: &CompletionAdjustments,
    ) -> DocumentCompletion {
        let mut all_lines_complete = true;
        let mut measured_total: u32 = 0;
        let mut effective_required_total: u32 = 0;

        for line in &document.lines {
            if !Self::line_complete(line, measure, adjustments) {
                all_lines_complete = false;
            }
            measured_total += line.measure_qty(measure);
            effective_required_total += adjustments.effective_required(line);
        }

        DocumentCompletion {
            all_lines_complete,
            sums_match: measured_total == effective_required_total,
            measured_total,
            effective_required_total,
        }
    }
}
