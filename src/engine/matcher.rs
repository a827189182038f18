// ==========================================
// 仓库扫描对账系统 - 扫描匹配引擎
// ==========================================
// 职责: 把规范码解析到明细行 (行下标, 倍数)
// 红线: 解析顺序固定: 主码 → 备用条码 → 内包装索引
// ==========================================

use crate::domain::line::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// PackContent - 内包装内容
// ==========================================
// 一个内包装码代表 N 件某物料(后端容器内容索引提供)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackContent {
    pub article_code: String, // 所含物料码
    pub multiplier: u32,      // 件数倍数
}

// ==========================================
// ScanMatcher - 扫描匹配引擎
// ==========================================
// 索引结构在单据装载/手工补录后重建,匹配本身零分配
pub struct ScanMatcher {
    code_index: HashMap<String, usize>,      // 主码 → 行下标
    alternate_index: HashMap<String, usize>, // 备用条码 → 行下标
    pack_index: HashMap<String, PackContent>, // 内包装码 → (物料码, 倍数)
}

impl ScanMatcher {
    /// 基于单据与内包装索引构建匹配器
    pub fn new(document: &Document, pack_index: HashMap<String, PackContent>) -> Self {
        let mut matcher = Self {
            code_index: HashMap::new(),
            alternate_index: HashMap::new(),
            pack_index,
        };
        matcher.rebuild(document);
        matcher
    }

    /// 重建行索引(单据行增删后必须调用)
    pub fn rebuild(&mut self, document: &Document) {
        self.code_index.clear();
        self.alternate_index.clear();

        for (idx, line) in document.lines.iter().enumerate() {
            self.code_index.insert(line.code.clone(), idx);
            if let Some(alt) = &line.alternate_code {
                if !alt.is_empty() {
                    self.alternate_index.insert(alt.clone(), idx);
                }
            }
        }

        debug!(
            lines = self.code_index.len(),
            alternates = self.alternate_index.len(),
            packs = self.pack_index.len(),
            "扫描匹配索引已重建"
        );
    }

    /// 解析规范码
    ///
    /// 解析顺序:
    /// 1. 主码精确匹配 → 倍数 1
    /// 2. 备用条码精确匹配 → 倍数 1
    /// 3. 内包装索引 → 所含物料行 + 包装倍数
    ///
    /// # 返回
    /// - `Some((行下标, 倍数))`: 命中
    /// - `None`: 未命中(调用方可走手工补录兜底)
    pub fn resolve(&self, code: &str) -> Option<(usize, u32)> {
        if let Some(&idx) = self.code_index.get(code) {
            return Some((idx, 1));
        }
        if let Some(&idx) = self.alternate_index.get(code) {
            return Some((idx, 1));
        }
        if let Some(pack) = self.pack_index.get(code) {
            // 内包装命中但所含物料不在单据上 → 视为未命中
            if let Some(&idx) = self.code_index.get(&pack.article_code) {
                return Some((idx, pack.multiplier));
            }
            debug!(
                pack_code = code,
                article_code = %pack.article_code,
                "内包装命中但物料不在单据上"
            );
        }
        None
    }

    /// 内包装索引中查询某码(手工补录兜底可借此拿到物料码)
    pub fn pack_content(&self, code: &str) -> Option<&PackContent> {
        self.pack_index.get(code)
    }
}
