// ==========================================
// 仓库扫描对账系统 - 对账配置
// ==========================================
// 职责: 一个引擎 + 一份显式配置,替代六个画面各自硬编码
// 红线: 策略/口径/容器要求必须可被测试确定性指定
// ==========================================

use crate::domain::types::{OverflowPolicy, RequirementMeasure};
use serde::{Deserialize, Serialize};

// ==========================================
// ReconciliationConfig - 单据级对账配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// 超量策略
    pub overflow_policy: OverflowPolicy,

    /// 完成度量口径
    pub requirement_measure: RequirementMeasure,

    /// 是否要求先扫容器再扫物料
    pub require_container: bool,

    /// 是否允许移除明细行(仅盘点作业)
    pub allow_line_removal: bool,

    /// 是否允许手工补录未命中码(外部目录兜底)
    pub allow_manual_add: bool,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            overflow_policy: OverflowPolicy::Strict,
            requirement_measure: RequirementMeasure::Scanned,
            require_container: false,
            allow_line_removal: false,
            allow_manual_add: true,
        }
    }
}

impl ReconciliationConfig {
    /// 严格策略快捷构造(测试/演示用)
    pub fn strict() -> Self {
        Self::default()
    }

    /// 弹性策略快捷构造(测试/演示用)
    pub fn elastic() -> Self {
        Self {
            overflow_policy: OverflowPolicy::Elastic,
            ..Self::default()
        }
    }

    /// 开启容器要求
    pub fn with_container(mut self) -> Self {
        self.require_container = true;
        self
    }

    /// 指定完成口径
    pub fn with_measure(mut self, measure: RequirementMeasure) -> Self {
        self.requirement_measure = measure;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict_scanned() {
        let config = ReconciliationConfig::default();
        assert_eq!(config.overflow_policy, OverflowPolicy::Strict);
        assert_eq!(config.requirement_measure, RequirementMeasure::Scanned);
        assert!(!config.require_container);
        assert!(!config.allow_line_removal);
        assert!(config.allow_manual_add);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        // serde(default): 局部覆写文件只写差异字段
        let config: ReconciliationConfig =
            serde_json::from_str(r#"{"overflow_policy":"ELASTIC"}"#).unwrap();
        assert_eq!(config.overflow_policy, OverflowPolicy::Elastic);
        assert_eq!(config.requirement_measure, RequirementMeasure::Scanned);
    }
}
