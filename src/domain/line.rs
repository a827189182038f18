// ==========================================
// 仓库扫描对账系统 - 单据明细领域模型
// ==========================================
// 红线: Document 独占持有所有明细行,行以下标寻址,无独立身份
// 用途: 后端拉取后构建,引擎层原地修改
// ==========================================

use crate::domain::types::{RequirementMeasure, WorkflowKind};
use serde::{Deserialize, Serialize};

// ==========================================
// Line - 单据明细行
// ==========================================
// 红线: 0 ≤ scanned ≤ required, 0 ≤ packed ≤ required
// (弹性超量接受瞬间同步抬升 required,不变量随即恢复)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    // ===== 标识 =====
    pub code: String,                    // 物料主码(已归一化)
    pub alternate_code: Option<String>,  // 备用条码(同样指向本行)

    // ===== 基础信息 =====
    pub description: Option<String>,     // 品名
    pub unit: Option<String>,            // 计量单位

    // ===== 数量计数器 =====
    pub required: u32,                   // 应收数量(可变: 弹性接受/异常会改写)
    pub packed: u32,                     // 已放置数量(人工装箱计数)
    pub scanned: u32,                    // 已扫描确认数量

    // ===== 审计字段 =====
    pub note: Option<String>,            // 审计批注(异常处理器写入)
    pub manual_added: bool,              // 是否为现场手工补录行
}

impl Line {
    /// 创建新明细行(计数器清零)
    pub fn new(code: impl Into<String>, required: u32) -> Self {
        Self {
            code: code.into(),
            alternate_code: None,
            description: None,
            unit: None,
            required,
            packed: 0,
            scanned: 0,
            note: None,
            manual_added: false,
        }
    }

    /// 设置备用条码
    pub fn with_alternate_code(mut self, alt: impl Into<String>) -> Self {
        self.alternate_code = Some(alt.into());
        self
    }

    /// 设置品名
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// 设置计量单位
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// 标记为手工补录行
    pub fn manual(mut self) -> Self {
        self.manual_added = true;
        self
    }

    /// 按口径读取计数
    pub fn measure_qty(&self, measure: RequirementMeasure) -> u32 {
        match measure {
            RequirementMeasure::Scanned => self.scanned,
            RequirementMeasure::Packed => self.packed,
        }
    }

    /// 按口径计算缺口(已满足时为 0)
    pub fn remaining(&self, measure: RequirementMeasure) -> u32 {
        self.required.saturating_sub(self.measure_qty(measure))
    }

    /// 追加审计批注(已有批注则换行续写)
    pub fn append_note(&mut self, text: &str) {
        match &mut self.note {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(text);
            }
            None => self.note = Some(text.to_string()),
        }
    }
}

// ==========================================
// DocumentHeader - 单据头
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub folio: String,                  // 单据号
    pub workflow: WorkflowKind,         // 作业类型
    pub origin: Option<String>,         // 来源(供应商/发货仓)
    pub destination: Option<String>,    // 目的(库区/收货仓)
    pub operator: Option<String>,       // 作业员
}

impl DocumentHeader {
    /// 创建单据头
    pub fn new(folio: impl Into<String>, workflow: WorkflowKind) -> Self {
        Self {
            folio: folio.into(),
            workflow,
            origin: None,
            destination: None,
            operator: None,
        }
    }
}

// ==========================================
// Document - 单据(明细行的独占所有者)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub header: DocumentHeader,
    pub lines: Vec<Line>,
}

impl Document {
    /// 创建单据
    pub fn new(header: DocumentHeader, lines: Vec<Line>) -> Self {
        Self { header, lines }
    }

    /// 行数
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 按下标取行
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// 按主码查找行下标(要求传入已归一化的码)
    pub fn find_by_code(&self, code: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.code == code)
    }

    /// 追加明细行,返回新行下标
    pub fn push_line(&mut self, line: Line) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// 移除明细行(仅盘点作业允许,由会话层把关)
    pub fn remove_line(&mut self, index: usize) -> Option<Line> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }
}
