use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::outcome::{CheckStatus, ModuleResult};
use super::target::MonitorTarget;

/// 运行级汇总
///
/// 各计数之和恒等于报告中的模块结果数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub overall_status: CheckStatus,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// 从模块结果集合折叠出汇总
    ///
    /// 总体状态按 FAIL > WARNING > PASS 优先级取值，
    /// SKIPPED 不会降低总体状态。
    pub fn from_results(results: &[ModuleResult]) -> Self {
        let mut summary = Self {
            overall_status: CheckStatus::Pass,
            total_checks: results.len(),
            passed: 0,
            failed: 0,
            warnings: 0,
            skipped: 0,
        };

        for result in results {
            match result.status() {
                CheckStatus::Pass => summary.passed += 1,
                CheckStatus::Fail => summary.failed += 1,
                CheckStatus::Warning => summary.warnings += 1,
                CheckStatus::Skipped => summary.skipped += 1,
            }
        }

        summary.overall_status = if summary.failed > 0 {
            CheckStatus::Fail
        } else if summary.warnings > 0 {
            CheckStatus::Warning
        } else {
            CheckStatus::Pass
        };

        summary
    }
}

/// 一次监控运行的完整报告
///
/// `run_monitoring` 的最终产物，外部渲染器只读消费。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub target: MonitorTarget,
    pub summary: RunSummary,
    /// 按开始时间排序的模块结果
    pub results: Vec<ModuleResult>,
    /// 本次运行使用的配置快照
    pub config_snapshot: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn is_healthy(&self) -> bool {
        self.summary.overall_status == CheckStatus::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::{Issue, Severity};
    use crate::models::outcome::ModuleOutcome;

    fn result_with(issues: Vec<Issue>) -> ModuleResult {
        ModuleResult::new(
            "m",
            "Module",
            Utc::now(),
            ModuleOutcome::from_issues(issues, 1),
            None,
        )
    }

    fn skipped_result() -> ModuleResult {
        ModuleResult::new("m", "Module", Utc::now(), ModuleOutcome::skipped(), None)
    }

    #[test]
    fn test_summary_counts_sum_to_total() {
        let results = vec![
            result_with(vec![]),
            result_with(vec![Issue::new("a", "a", Severity::Warning, "t")]),
            result_with(vec![Issue::new("b", "b", Severity::Critical, "t")]),
            skipped_result(),
        ];
        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.total_checks, 4);
        assert_eq!(
            summary.passed + summary.failed + summary.warnings + summary.skipped,
            results.len()
        );
    }

    #[test]
    fn test_overall_status_precedence() {
        // 任何失败 => FAIL
        let results = vec![
            result_with(vec![]),
            result_with(vec![Issue::new("b", "b", Severity::Error, "t")]),
        ];
        assert_eq!(
            RunSummary::from_results(&results).overall_status,
            CheckStatus::Fail
        );

        // 无失败但有警告 => WARNING
        let results = vec![
            result_with(vec![]),
            result_with(vec![Issue::new("a", "a", Severity::Info, "t")]),
        ];
        assert_eq!(
            RunSummary::from_results(&results).overall_status,
            CheckStatus::Warning
        );

        // 跳过不影响总体状态
        let results = vec![result_with(vec![]), skipped_result()];
        assert_eq!(
            RunSummary::from_results(&results).overall_status,
            CheckStatus::Pass
        );
    }
}
