// ==========================================
// 仓库扫描对账系统 - 容器归属追踪引擎
// ==========================================
// 职责: 管理会话内容器实例与活动容器,归集装箱清单
// 红线: 纯加法记账,不参与匹配与完成判定;切换活动容器不改历史清单
// ==========================================

use crate::domain::container::{ContainerInstance, ContainerType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

// ==========================================
// ContainerTracker - 容器追踪器
// ==========================================
pub struct ContainerTracker {
    types: HashMap<String, ContainerType>, // 容器类型码 → 类型
    instances: Vec<ContainerInstance>,     // 会话内全部实例(开箱顺序)
    active: Option<usize>,                 // 活动容器下标
    adding: bool,                          // "再加一箱"子模式(仅接受容器码)
}

impl ContainerTracker {
    /// 基于后端容器类型表创建追踪器
    pub fn new(types: Vec<ContainerType>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.code.clone(), t)).collect(),
            instances: Vec::new(),
            active: None,
            adding: false,
        }
    }

    // ==========================================
    // 识别与开箱
    // ==========================================

    /// 是否为已知容器类型码(要求传入规范码)
    pub fn is_container_code(&self, code: &str) -> bool {
        self.types.contains_key(code)
    }

    /// 扫描容器码: 开新实例并设为活动容器
    ///
    /// 第一个容器隐式成为活动容器;"再加一箱"子模式随开箱自动退出
    pub fn open(&mut self, type_code: &str, now: DateTime<Utc>) -> Option<&ContainerInstance> {
        if !self.types.contains_key(type_code) {
            return None;
        }

        let seq_no = self.instances.len() as u32 + 1;
        let instance = ContainerInstance::open(
            Uuid::new_v4().to_string(),
            type_code,
            seq_no,
            now,
        );
        debug!(
            instance_id = %instance.instance_id,
            type_code,
            seq_no,
            "开新容器"
        );
        self.instances.push(instance);
        self.active = Some(self.instances.len() - 1);
        self.adding = false;
        self.instances.last()
    }

    /// 切换活动容器(按实例ID)
    pub fn switch_active(&mut self, instance_id: &str) -> bool {
        match self
            .instances
            .iter()
            .position(|c| c.instance_id == instance_id)
        {
            Some(idx) => {
                self.active = Some(idx);
                debug!(instance_id, "切换活动容器");
                true
            }
            None => false,
        }
    }

    // ==========================================
    // "再加一箱"子模式
    // ==========================================

    /// 进入子模式: 下一次扫描只接受容器码
    pub fn begin_add_mode(&mut self) {
        self.adding = true;
    }

    /// 退出子模式(操作员取消)
    pub fn cancel_add_mode(&mut self) {
        self.adding = false;
    }

    /// 是否处于"再加一箱"子模式
    pub fn is_adding(&self) -> bool {
        self.adding
    }

    // ==========================================
    // 记账
    // ==========================================

    /// 把一次成功扫描归属到活动容器
    ///
    /// 无活动容器时为空操作(作业未要求容器的画面)
    pub fn record_scan(&mut self, article_code: &str, qty: u32) {
        if let Some(idx) = self.active {
            self.instances[idx].record(article_code, qty);
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 活动容器
    pub fn active(&self) -> Option<&ContainerInstance> {
        self.active.map(|idx| &self.instances[idx])
    }

    /// 是否已有活动容器
    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    /// 全部实例(开箱顺序)
    pub fn instances(&self) -> &[ContainerInstance] {
        &self.instances
    }

    /// 全部清单总件数
    pub fn total_units(&self) -> u32 {
        self.instances.iter().map(|c| c.total_units()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ContainerTracker {
        ContainerTracker::new(vec![
            ContainerType::new("BOX", "纸箱"),
            ContainerType::new("PALLET", "托盘"),
        ])
    }

    #[test]
    fn test_recognizes_container_codes() {
        let t = tracker();
        assert!(t.is_container_code("BOX"));
        assert!(t.is_container_code("PALLET"));
        assert!(!t.is_container_code("A100"));
    }

    #[test]
    fn test_first_open_becomes_active() {
        let mut t = tracker();
        assert!(!t.has_active());

        let now = Utc::now();
        let id = t.open("BOX", now).unwrap().instance_id.clone();
        assert!(t.has_active());
        assert_eq!(t.active().unwrap().instance_id, id);
        assert_eq!(t.active().unwrap().seq_no, 1);
    }

    #[test]
    fn test_open_unknown_type_is_none() {
        let mut t = tracker();
        assert!(t.open("CRATE", Utc::now()).is_none());
        assert!(!t.has_active());
    }

    #[test]
    fn test_scans_attributed_to_active_only() {
        let mut t = tracker();
        let now = Utc::now();

        let first = t.open("BOX", now).unwrap().instance_id.clone();
        t.record_scan("A100", 2);

        let second = t.open("BOX", now).unwrap().instance_id.clone();
        t.record_scan("A100", 1);
        t.record_scan("B200", 4);

        // 切换回第一箱再记账,第二箱清单不动
        assert!(t.switch_active(&first));
        t.record_scan("A100", 3);

        let by_id = |id: &str| {
            t.instances()
                .iter()
                .find(|c| c.instance_id == id)
                .unwrap()
                .clone()
        };
        assert_eq!(by_id(&first).quantity_of("A100"), 5);
        assert_eq!(by_id(&second).quantity_of("A100"), 1);
        assert_eq!(by_id(&second).quantity_of("B200"), 4);
        assert_eq!(t.total_units(), 10);
    }

    #[test]
    fn test_switch_to_unknown_instance_fails() {
        let mut t = tracker();
        t.open("BOX", Utc::now());
        assert!(!t.switch_active("no-such-id"));
        assert!(t.has_active());
    }

    #[test]
    fn test_add_mode_cleared_by_open() {
        let mut t = tracker();
        t.begin_add_mode();
        assert!(t.is_adding());

        t.open("PALLET", Utc::now());
        assert!(!t.is_adding());

        t.begin_add_mode();
        t.cancel_add_mode();
        assert!(!t.is_adding());
    }

    #[test]
    fn test_record_without_active_is_noop() {
        let mut t = tracker();
        t.record_scan("A100", 1);
        assert_eq!(t.total_units(), 0);
    }
}
