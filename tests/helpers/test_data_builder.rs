// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use wms_scan_recon::domain::line::{Document, DocumentHeader, Line};
use wms_scan_recon::domain::types::WorkflowKind;

// ==========================================
// Line 构建器
// ==========================================

pub struct LineBuilder {
    code: String,
    alternate_code: Option<String>,
    description: Option<String>,
    required: u32,
    packed: u32,
    scanned: u32,
}

impl LineBuilder {
    pub fn new(code: &str, required: u32) -> Self {
        Self {
            code: code.to_string(),
            alternate_code: None,
            description: None,
            required,
            packed: 0,
            scanned: 0,
        }
    }

    pub fn alternate(mut self, alt: &str) -> Self {
        self.alternate_code = Some(alt.to_string());
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn scanned(mut self, scanned: u32) -> Self {
        self.scanned = scanned;
        self
    }

    pub fn packed(mut self, packed: u32) -> Self {
        self.packed = packed;
        self
    }

    pub fn build(self) -> Line {
        let mut line = Line::new(self.code, self.required);
        line.alternate_code = self.alternate_code;
        line.description = self.description;
        line.scanned = self.scanned;
        line.packed = self.packed;
        line
    }
}

// ==========================================
// Document 构建器
// ==========================================

pub struct DocumentBuilder {
    folio: String,
    workflow: WorkflowKind,
    operator: Option<String>,
    lines: Vec<Line>,
}

impl DocumentBuilder {
    pub fn new(folio: &str, workflow: WorkflowKind) -> Self {
        Self {
            folio: folio.to_string(),
            workflow,
            operator: None,
            lines: Vec::new(),
        }
    }

    pub fn operator(mut self, operator: &str) -> Self {
        self.operator = Some(operator.to_string());
        self
    }

    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn build(self) -> Document {
        let mut header = DocumentHeader::new(self.folio, self.workflow);
        header.operator = self.operator;
        Document::new(header, self.lines)
    }
}
