// ==========================================
// 仓库扫描对账系统 - 容器领域模型
// ==========================================
// 红线: 容器清单只做加法记账,单据定稿后不再变动
// 用途: 收货/拣配作业的装箱归属追踪
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ContainerType - 容器类型
// ==========================================
// 来源: 后端容器类型表(箱/托盘/料架等)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerType {
    pub code: String, // 容器类型码(扫描识别用,已归一化)
    pub name: String, // 容器名称
}

impl ContainerType {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

// ==========================================
// ContainerInstance - 容器实例
// ==========================================
// 一次扫描容器码 = 一个新实例; 清单按物料码累计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerInstance {
    // ===== 标识 =====
    pub instance_id: String,       // 实例ID(UUID)
    pub type_code: String,         // 容器类型码
    pub seq_no: u32,               // 会话内序号(从 1 起,展示用)

    // ===== 审计字段 =====
    pub opened_at: DateTime<Utc>,  // 开箱时间

    // ===== 装箱清单 =====
    // BTreeMap 保证遍历顺序稳定,便于报告与测试
    pub manifest: BTreeMap<String, u32>, // 物料码 → 累计放置数量
}

impl ContainerInstance {
    /// 开新容器实例
    pub fn open(
        instance_id: String,
        type_code: impl Into<String>,
        seq_no: u32,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id,
            type_code: type_code.into(),
            seq_no,
            opened_at,
            manifest: BTreeMap::new(),
        }
    }

    /// 累计一次放置
    pub fn record(&mut self, article_code: &str, qty: u32) {
        *self.manifest.entry(article_code.to_string()).or_insert(0) += qty;
    }

    /// 清单内单品种数量
    pub fn quantity_of(&self, article_code: &str) -> u32 {
        self.manifest.get(article_code).copied().unwrap_or(0)
    }

    /// 清单总件数
    pub fn total_units(&self) -> u32 {
        self.manifest.values().sum()
    }
}
