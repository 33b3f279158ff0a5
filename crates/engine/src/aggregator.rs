use chrono::{DateTime, Utc};
use uuid::Uuid;

use monitor_core::{
    CheckStatus, Issue, ModuleOutcome, ModuleResult, MonitorTarget, RunReport, RunSummary,
    Severity,
};

/// 运行聚合器
///
/// 把一次运行收集到的模块结果折叠成汇总和最终报告。
pub struct RunAggregator;

impl RunAggregator {
    /// 生成最终报告
    pub fn build_report(
        run_id: Uuid,
        target: MonitorTarget,
        results: Vec<ModuleResult>,
        config_snapshot: serde_json::Value,
        started_at: DateTime<Utc>,
    ) -> RunReport {
        let summary = RunSummary::from_results(&results);
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        RunReport {
            run_id,
            target,
            summary,
            results,
            config_snapshot,
            started_at,
            duration_ms,
        }
    }

    /// 运行级失败边界
    ///
    /// 运行准备阶段（模块执行前）出错时仍返回结构完整的报告：
    /// 零个模块结果、总体 FAIL、failed 计 1，调用方永远拿得到
    /// 一个可渲染的报告对象。
    pub fn failure_report(
        run_id: Uuid,
        target: MonitorTarget,
        mut config_snapshot: serde_json::Value,
        started_at: DateTime<Utc>,
        error: &str,
    ) -> RunReport {
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        if let serde_json::Value::Object(ref mut map) = config_snapshot {
            map.insert(
                "run_failure".to_string(),
                serde_json::Value::String(error.to_string()),
            );
        }
        RunReport {
            run_id,
            target,
            summary: RunSummary {
                overall_status: CheckStatus::Fail,
                total_checks: 0,
                passed: 0,
                failed: 1,
                warnings: 0,
                skipped: 0,
            },
            results: Vec::new(),
            config_snapshot,
            started_at,
            duration_ms,
        }
    }
}

/// 把一次基础设施失败合成为单条 CRITICAL 发现
pub fn synthetic_failure_issue(module_id: &str, error: &str) -> Issue {
    Issue::new(
        format!("{module_id}-execution-failure"),
        format!("Module {module_id} failed to execute"),
        Severity::Critical,
        "execution",
    )
    .with_description(error.to_string())
}

/// 失败的模块产出：FAIL 状态加恰好一条合成发现
pub fn synthetic_failure_outcome(module_id: &str, error: &str) -> ModuleOutcome {
    ModuleOutcome::from_issues(vec![synthetic_failure_issue(module_id, error)], 0)
}
