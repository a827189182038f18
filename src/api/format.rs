// ==========================================
// 仓库扫描对账系统 - 展示格式化工具
// ==========================================
// 职责: 单据号补零/字母数字拆分等展示侧启发式
// 红线: 仅供界面展示,引擎匹配一律走归一化接口,不用这里
// ==========================================

/// 把码拆为字母前缀与数字尾部
///
/// 拆分点取最后一段连续数字的起点;无数字尾部时数字段为空
pub fn split_alpha_numeric(code: &str) -> (&str, &str) {
    let split_at = code
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(code.len());
    code.split_at(split_at)
}

/// 单据号数字部分补零到指定宽度
///
/// `pad_folio("REC-12", 6)` → `"REC-000012"`
/// 无数字尾部的输入原样返回
pub fn pad_folio(folio: &str, width: usize) -> String {
    let (prefix, digits) = split_alpha_numeric(folio);
    if digits.is_empty() {
        return folio.to_string();
    }
    format!("{}{:0>width$}", prefix, digits, width = width)
}
