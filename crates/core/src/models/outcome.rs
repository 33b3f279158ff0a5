use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::issue::Issue;

/// 检查状态
///
/// 模块级与运行级共用的状态枚举。模块自身的状态由其发现列表推导，
/// 运行级状态由所有模块状态聚合得出。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "SKIPPED")]
    Skipped,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Skipped => "SKIPPED",
        }
    }

    /// 根据发现列表推导模块状态
    ///
    /// 存在 ERROR/CRITICAL 级发现则为 FAIL，存在任意发现则为 WARNING，
    /// 否则为 PASS。
    pub fn from_issues(issues: &[Issue]) -> Self {
        if issues.iter().any(|i| i.severity.is_failure()) {
            CheckStatus::Fail
        } else if !issues.is_empty() {
            CheckStatus::Warning
        } else {
            CheckStatus::Pass
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 模块单次执行的产出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutcome {
    pub status: CheckStatus,
    pub issues: Vec<Issue>,
    /// 模块自报的执行耗时（毫秒）
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ModuleOutcome {
    /// 从发现列表构造产出，状态自动推导
    pub fn from_issues(issues: Vec<Issue>, execution_time_ms: u64) -> Self {
        Self {
            status: CheckStatus::from_issues(&issues),
            issues,
            execution_time_ms,
            metadata: HashMap::new(),
        }
    }

    /// 无发现的通过产出
    pub fn pass(execution_time_ms: u64) -> Self {
        Self::from_issues(Vec::new(), execution_time_ms)
    }

    /// 被跳过的产出（`can_monitor` 返回 false）
    pub fn skipped() -> Self {
        Self {
            status: CheckStatus::Skipped,
            issues: Vec::new(),
            execution_time_ms: 0,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// 模块执行结果
///
/// 在 [`ModuleOutcome`] 之上包一层调度元数据：模块标识、起止时间、
/// 耗时，以及模块抛出（而非正常返回）时捕获的失败信息。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module_id: String,
    pub module_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// 墙钟耗时（毫秒），等于 `completed_at - started_at`
    pub duration_ms: u64,
    pub outcome: ModuleOutcome,
    /// 基础设施失败的原始错误信息
    pub error: Option<String>,
}

impl ModuleResult {
    pub fn new(
        module_id: impl Into<String>,
        module_name: impl Into<String>,
        started_at: DateTime<Utc>,
        outcome: ModuleOutcome,
        error: Option<String>,
    ) -> Self {
        let completed_at = Utc::now();
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            module_id: module_id.into(),
            module_name: module_name.into(),
            started_at,
            completed_at,
            duration_ms,
            outcome,
            error,
        }
    }

    pub fn status(&self) -> CheckStatus {
        self.outcome.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::Severity;

    fn issue(severity: Severity) -> Issue {
        Issue::new("i", "issue", severity, "test")
    }

    #[test]
    fn test_status_from_no_issues_is_pass() {
        assert_eq!(CheckStatus::from_issues(&[]), CheckStatus::Pass);
    }

    #[test]
    fn test_status_from_info_and_warning_is_warning() {
        let issues = vec![issue(Severity::Info), issue(Severity::Warning)];
        assert_eq!(CheckStatus::from_issues(&issues), CheckStatus::Warning);
    }

    #[test]
    fn test_status_from_any_error_is_fail() {
        let issues = vec![issue(Severity::Info), issue(Severity::Error)];
        assert_eq!(CheckStatus::from_issues(&issues), CheckStatus::Fail);

        let issues = vec![issue(Severity::Critical)];
        assert_eq!(CheckStatus::from_issues(&issues), CheckStatus::Fail);
    }

    #[test]
    fn test_module_result_duration_non_negative() {
        let started = Utc::now();
        let result = ModuleResult::new("m", "Module", started, ModuleOutcome::pass(5), None);
        assert!(result.completed_at >= result.started_at);
        assert_eq!(
            result.duration_ms,
            (result.completed_at - result.started_at).num_milliseconds() as u64
        );
    }
}
