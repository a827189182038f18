// ==========================================
// 仓库扫描对账系统 - 作业计时引擎
// ==========================================
// 职责: 首次有效扫描起表,定稿确认停表,输出绩效等级
// 红线: 时间一律由调用方注入,引擎内不取系统时钟
// ==========================================

use crate::domain::types::PerformanceTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ===== 绩效阈值(秒/行) =====
const EXCELLENT_SECS_PER_LINE: f64 = 4.0;
const GOOD_SECS_PER_LINE: f64 = 8.0;
const NORMAL_SECS_PER_LINE: f64 = 15.0;

// ==========================================
// SessionClock - 作业计时器
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionClock {
    pub start_time: Option<DateTime<Utc>>, // 首次有效扫描时间
    pub elapsed_seconds: i64,              // 定稿冻结的耗时
    pub finalized: bool,                   // 是否已冻结
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 台账变更回调: 合计首次非零时起表
    ///
    /// 已起表或已冻结后均为空操作
    pub fn on_mutation(&mut self, nonzero_total: bool, now: DateTime<Utc>) {
        if self.finalized || self.start_time.is_some() {
            return;
        }
        if nonzero_total {
            self.start_time = Some(now);
        }
    }

    /// 定稿确认: 冻结耗时
    ///
    /// 未起表的单据(全零核销等)冻结为 0 秒
    pub fn freeze(&mut self, now: DateTime<Utc>) {
        if self.finalized {
            return;
        }
        self.elapsed_seconds = self.elapsed_at(now);
        self.finalized = true;
    }

    /// 某时刻的耗时秒数(冻结后恒为冻结值)
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> i64 {
        if self.finalized {
            return self.elapsed_seconds;
        }
        match self.start_time {
            Some(start) => (now - start).num_seconds().max(0),
            None => 0,
        }
    }

    /// 是否已起表
    pub fn started(&self) -> bool {
        self.start_time.is_some()
    }
}

// ==========================================
// 绩效评级
// ==========================================

/// 把 (耗时, 行数) 映射为绩效等级
///
/// 口径: 秒/行;空单据无从评比,按 NORMAL 处理
pub fn rate_performance(elapsed_seconds: i64, line_count: usize) -> PerformanceTier {
    if line_count == 0 {
        return PerformanceTier::Normal;
    }
    let secs_per_line = elapsed_seconds as f64 / line_count as f64;
    if secs_per_line <= EXCELLENT_SECS_PER_LINE {
        PerformanceTier::Excellent
    } else if secs_per_line <= GOOD_SECS_PER_LINE {
        PerformanceTier::Good
    } else if secs_per_line <= NORMAL_SECS_PER_LINE {
        PerformanceTier::Normal
    } else {
        PerformanceTier::Slow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_starts_on_first_nonzero_mutation() {
        let mut clock = SessionClock::new();
        clock.on_mutation(false, at(0)); // 零合计不起表
        assert!(!clock.started());

        clock.on_mutation(true, at(10));
        assert!(clock.started());
        assert_eq!(clock.start_time, Some(at(10)));

        // 再次变更不重置起点
        clock.on_mutation(true, at(99));
        assert_eq!(clock.start_time, Some(at(10)));
    }

    #[test]
    fn test_freeze_fixes_elapsed() {
        let mut clock = SessionClock::new();
        clock.on_mutation(true, at(0));
        assert_eq!(clock.elapsed_at(at(30)), 30);

        clock.freeze(at(45));
        assert!(clock.finalized);
        assert_eq!(clock.elapsed_seconds, 45);
        // 冻结后时间不再流动
        assert_eq!(clock.elapsed_at(at(500)), 45);

        clock.freeze(at(600)); // 重复冻结为空操作
        assert_eq!(clock.elapsed_seconds, 45);
    }

    #[test]
    fn test_freeze_without_start_is_zero() {
        let mut clock = SessionClock::new();
        clock.freeze(at(100));
        assert_eq!(clock.elapsed_seconds, 0);
    }

    #[test]
    fn test_rate_performance_tiers() {
        // 10 行: ≤40s 优秀, ≤80s 良好, ≤150s 正常, 其余偏慢
        assert_eq!(rate_performance(40, 10), PerformanceTier::Excellent);
        assert_eq!(rate_performance(41, 10), PerformanceTier::Good);
        assert_eq!(rate_performance(80, 10), PerformanceTier::Good);
        assert_eq!(rate_performance(150, 10), PerformanceTier::Normal);
        assert_eq!(rate_performance(151, 10), PerformanceTier::Slow);
    }

    #[test]
    fn test_rate_performance_empty_document() {
        assert_eq!(rate_performance(0, 0), PerformanceTier::Normal);
        assert_eq!(rate_performance(999, 0), PerformanceTier::Normal);
    }
}
