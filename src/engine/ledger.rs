// ==========================================
// 仓库扫描对账系统 - 数量台账引擎
// ==========================================
// 职责: 持有单据,集中实施所有计数器变更
// 红线: 0 ≤ scanned ≤ required 恒成立;严格策略下超量扫描零变更
// 红线: 台账外任何代码不得直接改写计数器
// ==========================================

use crate::domain::line::{Document, Line};
use crate::domain::types::{OverflowPolicy, RequirementMeasure};
use tracing::debug;

// ==========================================
// ScanApply - 扫描应用结果
// ==========================================
// 超量拒绝不是错误,是正常控制流,因此不走 Result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanApply {
    /// 接受: 计数器已更新
    Accepted {
        line_index: usize,
        multiplier: u32,
        scanned: u32,       // 更新后扫描数
        packed: u32,        // 更新后放置数
        required: u32,      // 更新后应收数
        grew_required: bool, // 弹性策略是否抬升了应收
    },
    /// 严格策略拒绝: 台账未变
    Overflow {
        line_index: usize,
        needed: u32,    // 还差多少件才到应收
        attempted: u32, // 本次扫描将要增加的件数
    },
}

// ==========================================
// ManualAdjust - 手工调整结果快照
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualAdjust {
    pub packed: u32,
    pub scanned: u32,
    pub changed: bool, // 是否发生了实际变更(边界上的空操作为 false)
}

// ==========================================
// QuantityLedger - 数量台账
// ==========================================
pub struct QuantityLedger {
    document: Document,
}

impl QuantityLedger {
    /// 接管单据所有权
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// 只读访问单据
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// 可变访问单据(仅限行增删,计数器变更走台账方法)
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// 取出单据(会话结束时用)
    pub fn into_document(self) -> Document {
        self.document
    }

    // ==========================================
    // 扫描应用
    // ==========================================

    /// 应用一次匹配成功的扫描
    ///
    /// 规则:
    /// - scanned + multiplier ≤ required → 接受,scanned 增加;
    ///   扫描驱动口径(SCANNED)下 packed 同步增加,
    ///   装箱驱动口径(PACKED)下 packed 由手工操作单独推进
    /// - 超出且严格策略 → 拒绝,台账不变,报告缺口与本次件数
    /// - 超出且弹性策略 → 接受,required 抬升为 scanned + multiplier,
    ///   scanned 与 packed 一并置为新总数(扫描即实情)
    pub fn apply_scan(
        &mut self,
        line_index: usize,
        multiplier: u32,
        policy: OverflowPolicy,
        measure: RequirementMeasure,
    ) -> Option<ScanApply> {
        let line = self.document.lines.get_mut(line_index)?;

        let new_scanned = line.scanned + multiplier;
        if new_scanned <= line.required {
            line.scanned = new_scanned;
            if measure == RequirementMeasure::Scanned {
                line.packed = (line.packed + multiplier).min(line.required);
            }
            debug!(
                code = %line.code,
                scanned = line.scanned,
                required = line.required,
                "扫描接受"
            );
            return Some(ScanApply::Accepted {
                line_index,
                multiplier,
                scanned: line.scanned,
                packed: line.packed,
                required: line.required,
                grew_required: false,
            });
        }

        match policy {
            OverflowPolicy::Strict => {
                let needed = line.required.saturating_sub(line.scanned);
                debug!(
                    code = %line.code,
                    needed,
                    attempted = multiplier,
                    "严格策略拒绝超量扫描"
                );
                Some(ScanApply::Overflow {
                    line_index,
                    needed,
                    attempted: multiplier,
                })
            }
            OverflowPolicy::Elastic => {
                // 弹性策略: 扫描即实情,应收随实际增长
                line.required = new_scanned;
                line.scanned = new_scanned;
                line.packed = new_scanned;
                debug!(
                    code = %line.code,
                    required = line.required,
                    "弹性策略接受超量,应收抬升"
                );
                Some(ScanApply::Accepted {
                    line_index,
                    multiplier,
                    scanned: line.scanned,
                    packed: line.packed,
                    required: line.required,
                    grew_required: true,
                })
            }
        }
    }

    // ==========================================
    // 手工调整 (独立于扫描确认)
    // ==========================================

    /// 放置数 +1(不超过应收)
    pub fn increment(&mut self, line_index: usize) -> Option<ManualAdjust> {
        let line = self.document.lines.get_mut(line_index)?;
        let changed = line.packed < line.required;
        if changed {
            line.packed += 1;
        }
        Some(ManualAdjust {
            packed: line.packed,
            scanned: line.scanned,
            changed,
        })
    }

    /// 放置数 -1,并把扫描数压到不高于新放置数
    ///
    /// 放置数为 0 时是空操作,不触碰扫描数
    pub fn decrement(&mut self, line_index: usize) -> Option<ManualAdjust> {
        let line = self.document.lines.get_mut(line_index)?;
        let changed = line.packed > 0;
        if changed {
            line.packed -= 1;
            line.scanned = line.scanned.min(line.packed);
        }
        Some(ManualAdjust {
            packed: line.packed,
            scanned: line.scanned,
            changed,
        })
    }

    /// 放置数一键补满到应收
    pub fn fill_to_required(&mut self, line_index: usize) -> Option<ManualAdjust> {
        let line = self.document.lines.get_mut(line_index)?;
        let changed = line.packed != line.required;
        line.packed = line.required;
        Some(ManualAdjust {
            packed: line.packed,
            scanned: line.scanned,
            changed,
        })
    }

    // ==========================================
    // 异常核销 (仅异常处理器调用)
    // ==========================================

    /// 短装核销: 按实际到货数量封口
    pub fn apply_missing(&mut self, line_index: usize, actual_qty: u32) -> Option<()> {
        let line = self.document.lines.get_mut(line_index)?;
        let original = line.required;
        line.required = actual_qty;
        line.scanned = actual_qty;
        line.packed = actual_qty;
        line.append_note(&format!(
            "SHORT_SHIPPED: required={} received={}",
            original, actual_qty
        ));
        Some(())
    }

    /// 串货核销: 应收行按原应收数量视为满足,到货品种记入批注
    pub fn apply_changed(
        &mut self,
        line_index: usize,
        arrived_code: &str,
        arrived_qty: u32,
    ) -> Option<()> {
        let line = self.document.lines.get_mut(line_index)?;
        line.scanned = line.required;
        line.packed = line.required;
        line.append_note(&format!(
            "CHANGED_ARRIVAL: arrived={} qty={}",
            arrived_code, arrived_qty
        ));
        Some(())
    }

    /// 退回核销: 扫描数清零,差额记入批注
    pub fn apply_return(&mut self, line_index: usize, returned_qty: u32) -> Option<()> {
        let line = self.document.lines.get_mut(line_index)?;
        line.scanned = 0;
        line.packed = line.packed.min(line.required.saturating_sub(returned_qty));
        line.append_note(&format!(
            "RETURNED: required={} returned={}",
            line.required, returned_qty
        ));
        Some(())
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 全单合计: (口径合计, 应收合计)
    pub fn totals(&self, measure: RequirementMeasure) -> (u32, u32) {
        let measured = self
            .document
            .lines
            .iter()
            .map(|l| l.measure_qty(measure))
            .sum();
        let required = self.document.lines.iter().map(|l| l.required).sum();
        (measured, required)
    }

    /// 按下标取行
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.document.lines.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::line::{DocumentHeader, Line};
    use crate::domain::types::WorkflowKind;

    fn ledger_with(required: u32) -> QuantityLedger {
        let header = DocumentHeader::new("T-001", WorkflowKind::Receiving);
        QuantityLedger::new(Document::new(header, vec![Line::new("A100", required)]))
    }

    #[test]
    fn test_strict_scan_to_completion_then_overflow() {
        let mut ledger = ledger_with(3);

        for expect in 1..=3u32 {
            let apply = ledger
                .apply_scan(0, 1, OverflowPolicy::Strict, RequirementMeasure::Scanned)
                .unwrap();
            match apply {
                ScanApply::Accepted { scanned, .. } => assert_eq!(scanned, expect),
                other => panic!("expected Accepted, got {:?}", other),
            }
        }

        // 第四次扫描: 拒绝,缺口为 0,台账不变
        let apply = ledger
            .apply_scan(0, 1, OverflowPolicy::Strict, RequirementMeasure::Scanned)
            .unwrap();
        assert_eq!(
            apply,
            ScanApply::Overflow {
                line_index: 0,
                needed: 0,
                attempted: 1
            }
        );
        let line = ledger.line(0).unwrap();
        assert_eq!(line.scanned, 3);
        assert_eq!(line.required, 3);
    }

    #[test]
    fn test_elastic_overflow_grows_required() {
        let mut ledger = ledger_with(3);
        for _ in 0..3 {
            ledger
                .apply_scan(0, 1, OverflowPolicy::Elastic, RequirementMeasure::Scanned)
                .unwrap();
        }

        let apply = ledger
            .apply_scan(0, 1, OverflowPolicy::Elastic, RequirementMeasure::Scanned)
            .unwrap();
        match apply {
            ScanApply::Accepted {
                scanned,
                packed,
                required,
                grew_required,
                ..
            } => {
                assert_eq!(scanned, 4);
                assert_eq!(packed, 4);
                assert_eq!(required, 4);
                assert!(grew_required);
            }
            other => panic!("expected Accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_elastic_overflow_with_multiplier() {
        let mut ledger = ledger_with(2);
        // 内包装倍数 6,一次扫描直接越过应收
        let apply = ledger
            .apply_scan(0, 6, OverflowPolicy::Elastic, RequirementMeasure::Scanned)
            .unwrap();
        match apply {
            ScanApply::Accepted { required, .. } => assert_eq!(required, 6),
            other => panic!("expected Accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_overflow_reports_deficit_and_attempted() {
        let mut ledger = ledger_with(5);
        ledger
            .apply_scan(0, 3, OverflowPolicy::Strict, RequirementMeasure::Scanned)
            .unwrap();

        // 还差 2 件,内包装一次要加 6 件 → 拒绝并报告两个数字
        let apply = ledger
            .apply_scan(0, 6, OverflowPolicy::Strict, RequirementMeasure::Scanned)
            .unwrap();
        assert_eq!(
            apply,
            ScanApply::Overflow {
                line_index: 0,
                needed: 2,
                attempted: 6
            }
        );
    }

    #[test]
    fn test_packed_measure_scan_moves_scanned_only() {
        let mut ledger = ledger_with(3);
        ledger
            .apply_scan(0, 1, OverflowPolicy::Strict, RequirementMeasure::Packed)
            .unwrap();

        let line = ledger.line(0).unwrap();
        assert_eq!(line.scanned, 1);
        assert_eq!(line.packed, 0); // 装箱驱动口径: packed 由手工推进
    }

    #[test]
    fn test_increment_decrement_inverse() {
        let mut ledger = ledger_with(3);
        ledger.increment(0).unwrap();
        ledger.increment(0).unwrap();
        assert_eq!(ledger.line(0).unwrap().packed, 2);

        ledger.decrement(0).unwrap();
        ledger.increment(0).unwrap();
        assert_eq!(ledger.line(0).unwrap().packed, 2);
    }

    #[test]
    fn test_decrement_clamps_scanned() {
        let mut ledger = ledger_with(3);
        for _ in 0..3 {
            ledger
                .apply_scan(0, 1, OverflowPolicy::Strict, RequirementMeasure::Scanned)
                .unwrap();
        }
        assert_eq!(ledger.line(0).unwrap().packed, 3);

        let adj = ledger.decrement(0).unwrap();
        assert_eq!(adj.packed, 2);
        assert_eq!(adj.scanned, 2); // 扫描数被压到新放置数

        // 放置数为 0 时空操作
        ledger.decrement(0).unwrap();
        ledger.decrement(0).unwrap();
        let adj = ledger.decrement(0).unwrap();
        assert!(!adj.changed);
        assert_eq!(adj.packed, 0);
    }

    #[test]
    fn test_increment_caps_at_required() {
        let mut ledger = ledger_with(1);
        ledger.increment(0).unwrap();
        let adj = ledger.increment(0).unwrap();
        assert!(!adj.changed);
        assert_eq!(adj.packed, 1);
    }

    #[test]
    fn test_fill_to_required() {
        let mut ledger = ledger_with(7);
        let adj = ledger.fill_to_required(0).unwrap();
        assert!(adj.changed);
        assert_eq!(adj.packed, 7);
        assert_eq!(ledger.line(0).unwrap().scanned, 0);
    }

    #[test]
    fn test_apply_missing_seals_line() {
        let mut ledger = ledger_with(5);
        ledger.apply_missing(0, 3).unwrap();

        let line = ledger.line(0).unwrap();
        assert_eq!(line.required, 3);
        assert_eq!(line.scanned, 3);
        assert_eq!(line.packed, 3);
        assert!(line.note.as_deref().unwrap().contains("SHORT_SHIPPED"));
        assert!(line.note.as_deref().unwrap().contains("required=5"));
    }

    #[test]
    fn test_apply_changed_satisfies_expected_line() {
        let mut ledger = ledger_with(4);
        ledger.apply_changed(0, "B200", 4).unwrap();

        let line = ledger.line(0).unwrap();
        assert_eq!(line.required, 4);
        assert_eq!(line.scanned, 4);
        assert!(line.note.as_deref().unwrap().contains("arrived=B200"));
    }

    #[test]
    fn test_apply_return_resets_scanned() {
        let mut ledger = ledger_with(5);
        for _ in 0..5 {
            ledger
                .apply_scan(0, 1, OverflowPolicy::Strict, RequirementMeasure::Scanned)
                .unwrap();
        }
        ledger.apply_return(0, 2).unwrap();

        let line = ledger.line(0).unwrap();
        assert_eq!(line.scanned, 0);
        assert_eq!(line.packed, 3); // 退 2 件后放置数不超过 5-2
        assert!(line.note.as_deref().unwrap().contains("returned=2"));
    }

    #[test]
    fn test_totals() {
        let header = DocumentHeader::new("T-002", WorkflowKind::Receiving);
        let mut ledger = QuantityLedger::new(Document::new(
            header,
            vec![Line::new("A100", 3), Line::new("B200", 2)],
        ));
        ledger
            .apply_scan(0, 2, OverflowPolicy::Strict, RequirementMeasure::Scanned)
            .unwrap();

        assert_eq!(ledger.totals(RequirementMeasure::Scanned), (2, 5));
        assert_eq!(ledger.totals(RequirementMeasure::Packed), (2, 5));
    }

    #[test]
    fn test_invalid_index_is_none() {
        let mut ledger = ledger_with(1);
        assert!(ledger
            .apply_scan(9, 1, OverflowPolicy::Strict, RequirementMeasure::Scanned)
            .is_none());
        assert!(ledger.increment(9).is_none());
    }
}
