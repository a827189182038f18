// ==========================================
// 仓库扫描对账系统 - 作业配置档案
// ==========================================
// 职责: 五种作业画面 → 预置对账配置的映射
// 说明: 收货/拣配要容器;盘点走弹性并允许删行;
//       人工收货与拣配以放置数为完成口径(先装箱后扫描确认)
// ==========================================

use crate::config::reconciliation::ReconciliationConfig;
use crate::domain::types::{OverflowPolicy, RequirementMeasure, WorkflowKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// WorkflowProfiles - 全部作业档案
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowProfiles {
    profiles: HashMap<WorkflowKind, ReconciliationConfig>,
}

impl Default for WorkflowProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WorkflowProfiles {
    /// 内置预置档案
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();

        // 收货: 严格 + 容器 + 扫描口径
        profiles.insert(
            WorkflowKind::Receiving,
            ReconciliationConfig {
                overflow_policy: OverflowPolicy::Strict,
                requirement_measure: RequirementMeasure::Scanned,
                require_container: true,
                allow_line_removal: false,
                allow_manual_add: true,
            },
        );

        // 人工收货: 严格 + 容器 + 放置口径(先装箱,扫描只做确认)
        profiles.insert(
            WorkflowKind::ManualReceiving,
            ReconciliationConfig {
                overflow_policy: OverflowPolicy::Strict,
                requirement_measure: RequirementMeasure::Packed,
                require_container: true,
                allow_line_removal: false,
                allow_manual_add: true,
            },
        );

        // 盘点: 弹性(扫描即实情) + 无容器 + 允许删行
        profiles.insert(
            WorkflowKind::Counting,
            ReconciliationConfig {
                overflow_policy: OverflowPolicy::Elastic,
                requirement_measure: RequirementMeasure::Scanned,
                require_container: false,
                allow_line_removal: true,
                allow_manual_add: true,
            },
        );

        // 拣配装箱: 严格 + 容器 + 放置口径
        profiles.insert(
            WorkflowKind::OrderPacking,
            ReconciliationConfig {
                overflow_policy: OverflowPolicy::Strict,
                requirement_measure: RequirementMeasure::Packed,
                require_container: true,
                allow_line_removal: false,
                allow_manual_add: false,
            },
        );

        // 调拨: 严格 + 无容器 + 扫描口径
        profiles.insert(
            WorkflowKind::Transfer,
            ReconciliationConfig {
                overflow_policy: OverflowPolicy::Strict,
                requirement_measure: RequirementMeasure::Scanned,
                require_container: false,
                allow_line_removal: false,
                allow_manual_add: true,
            },
        );

        Self { profiles }
    }

    /// 取某作业的配置(未配置的作业回退默认严格配置)
    pub fn profile(&self, workflow: WorkflowKind) -> ReconciliationConfig {
        self.profiles
            .get(&workflow)
            .copied()
            .unwrap_or_default()
    }

    /// 覆写某作业的配置
    pub fn set_profile(&mut self, workflow: WorkflowKind, config: ReconciliationConfig) {
        self.profiles.insert(workflow, config);
    }

    /// 合并局部覆写(覆写文件里出现的作业才替换)
    pub fn merge_overrides(&mut self, overrides: HashMap<WorkflowKind, ReconciliationConfig>) {
        for (workflow, config) in overrides {
            self.profiles.insert(workflow, config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_all_workflows() {
        let profiles = WorkflowProfiles::builtin();
        for kind in WorkflowKind::all() {
            // 逐个取档案不得回退默认(内置必须全覆盖)
            assert!(profiles.profiles.contains_key(&kind), "{} 缺档案", kind);
        }
    }

    #[test]
    fn test_counting_is_elastic_with_removal() {
        let profiles = WorkflowProfiles::builtin();
        let config = profiles.profile(WorkflowKind::Counting);
        assert_eq!(config.overflow_policy, OverflowPolicy::Elastic);
        assert!(config.allow_line_removal);
        assert!(!config.require_container);
    }

    #[test]
    fn test_packing_uses_packed_measure() {
        let profiles = WorkflowProfiles::builtin();
        let config = profiles.profile(WorkflowKind::OrderPacking);
        assert_eq!(config.requirement_measure, RequirementMeasure::Packed);
        assert!(config.require_container);
    }

    #[test]
    fn test_merge_overrides_replaces_only_listed() {
        let mut profiles = WorkflowProfiles::builtin();
        let mut overrides = HashMap::new();
        overrides.insert(WorkflowKind::Transfer, ReconciliationConfig::elastic());
        profiles.merge_overrides(overrides);

        assert_eq!(
            profiles.profile(WorkflowKind::Transfer).overflow_policy,
            OverflowPolicy::Elastic
        );
        // 其余档案不受影响
        assert_eq!(
            profiles.profile(WorkflowKind::Receiving).overflow_policy,
            OverflowPolicy::Strict
        );
    }
}
