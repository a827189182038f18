// ==========================================
// 仓库扫描对账系统 - 条码归一化
// ==========================================
// 职责: 折叠扫描枪符号噪声,产出规范码
// 红线: 匹配引擎只接受规范码;展示用格式化工具不在此处
// ==========================================
// 说明: 键盘楔扫描枪会把 `-` 替换为 `'` 或 "`" 等字符,
//       不同枪型替换字符不同,统一折叠为"去分隔符 + 大写"
// ==========================================

// ==========================================
// CodeNormalizer Trait
// ==========================================

/// 条码归一化接口
///
/// 引擎只通过该接口接触原始扫描文本,便于按仓库/枪型替换策略
pub trait CodeNormalizer: Send + Sync {
    /// 把原始扫描文本归一化为规范码
    fn normalize(&self, raw: &str) -> String;
}

// ==========================================
// SeparatorFoldingNormalizer - 默认实现
// ==========================================

/// 默认归一化: 丢弃所有非字母数字字符,统一大写
///
/// `A-100` / `A'100` / ``A`100`` 均归一化为 `A100`
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparatorFoldingNormalizer;

impl CodeNormalizer for SeparatorFoldingNormalizer {
    fn normalize(&self, raw: &str) -> String {
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }
}

/// 使用默认策略归一化(便捷函数)
pub fn normalize_code(raw: &str) -> String {
    SeparatorFoldingNormalizer.normalize(raw)
}
