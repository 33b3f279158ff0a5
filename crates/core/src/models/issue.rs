use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 问题严重程度
///
/// 按紧急程度升序排列，`Ord` 实现与声明顺序一致，
/// 可以直接用 `>=` 比较两个严重程度。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "CRITICAL")]
    Critical,
}

impl Severity {
    /// 是否会导致模块状态判定为失败
    pub fn is_failure(&self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个检查发现
///
/// 模块在一次运行中产生的一条发现记录。创建后不可变，
/// 每次运行都重新生成，不做持久化。
///
/// # 字段说明
///
/// - `id`: 稳定的机器可读标识（同一次运行内唯一即可）
/// - `title`: 简短标题
/// - `description`: 详细描述
/// - `severity`: 严重程度
/// - `category`: 自由分组字符串，如 "access-control"、"selectors"
/// - `recommendation`: 可选的修复建议
/// - `metadata`: 模块自定义的上下文键值对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: String,
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Issue {
    /// 创建新发现
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        severity: Severity,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            severity,
            category: category.into(),
            recommendation: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_severity_is_failure() {
        assert!(!Severity::Info.is_failure());
        assert!(!Severity::Warning.is_failure());
        assert!(Severity::Error.is_failure());
        assert!(Severity::Critical.is_failure());
    }

    #[test]
    fn test_severity_serde_names() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }

    #[test]
    fn test_issue_builder() {
        let issue = Issue::new("missing-owner", "Missing owner", Severity::Error, "access-control")
            .with_description("Diamond has no owner set")
            .with_recommendation("Set an owner via the ownership facet")
            .with_metadata("facet", serde_json::json!("OwnershipFacet"));

        assert_eq!(issue.id, "missing-owner");
        assert_eq!(issue.severity, Severity::Error);
        assert!(issue.recommendation.is_some());
        assert_eq!(issue.metadata.len(), 1);
    }
}
