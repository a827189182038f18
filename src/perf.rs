// ==========================================
// 仓库扫描对账系统 - 性能统计
// ==========================================
// 职责: 关键操作耗时统计(结构化输出到 perf target)
// ==========================================

use std::time::Instant;

/// 性能统计 Guard：记录 op + elapsed_ms
///
/// 使用方式：
/// ```ignore
/// let _perf = wms_scan_recon::perf::PerfGuard::new("open_session");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            "done"
        );
    }
}
