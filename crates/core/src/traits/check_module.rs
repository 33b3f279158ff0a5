//! 检查模块接口定义
//!
//! 此模块定义了可插拔检查的核心抽象接口，包括：
//! - 检查模块接口（适用性探测、配置校验、执行、清理）
//! - 检查执行上下文
//! - 模块配置声明与校验结果
//! - 模块间执行顺序依赖声明
//!
//! ## 核心概念
//!
//! ### CheckModule
//! 检查模块是对一个部署目标执行单项健康检查的组件，例如：
//! - 函数选择器差异检查
//! - 访问控制启发式检查
//! - 代币供应量检查
//! - ERC165 接口自省检查
//!
//! 编排引擎完全不关心模块内部如何判定"健康"，只依赖本接口。
//!
//! ## 使用示例
//!
//! ```rust
//! use async_trait::async_trait;
//! use std::sync::Arc;
//! use monitor_core::traits::{CheckContext, CheckModule, Transport};
//! use monitor_core::models::{ModuleOutcome, MonitorTarget};
//! use monitor_core::MonitorResult;
//!
//! pub struct OwnershipCheck;
//!
//! #[async_trait]
//! impl CheckModule for OwnershipCheck {
//!     fn id(&self) -> &str {
//!         "ownership"
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Ownership Check"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Verifies the diamond has a valid owner"
//!     }
//!
//!     fn category(&self) -> &str {
//!         "access-control"
//!     }
//!
//!     async fn can_monitor(
//!         &self,
//!         _target: &MonitorTarget,
//!         _transport: &Arc<dyn Transport>,
//!     ) -> MonitorResult<bool> {
//!         Ok(true)
//!     }
//!
//!     async fn run(&self, _context: &CheckContext) -> MonitorResult<ModuleOutcome> {
//!         // 读取链上状态并产出发现列表
//!         Ok(ModuleOutcome::pass(0))
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ModuleOutcome, MonitorTarget};
use crate::{MonitorError, MonitorResult};

use super::transport::Transport;

/// 模块执行顺序依赖
///
/// 声明本模块希望严格排在另一个模块之后执行。
/// `optional` 为 true 时，被依赖模块不在本次运行子集中不算错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDependency {
    pub module_id: String,
    pub optional: bool,
}

impl ModuleDependency {
    pub fn required(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            optional: false,
        }
    }

    pub fn optional(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            optional: true,
        }
    }
}

/// 配置项的取值类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigValueType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "array")]
    Array,
}

impl ConfigValueType {
    fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            ConfigValueType::String => value.is_string(),
            ConfigValueType::Number => value.is_number(),
            ConfigValueType::Boolean => value.is_boolean(),
            ConfigValueType::Object => value.is_object(),
            ConfigValueType::Array => value.is_array(),
        }
    }
}

/// 模块声明的单个配置需求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRequirement {
    pub key: String,
    pub description: String,
    pub value_type: ConfigValueType,
    pub required: bool,
    pub default: Option<serde_json::Value>,
}

impl ConfigRequirement {
    pub fn required(
        key: impl Into<String>,
        description: impl Into<String>,
        value_type: ConfigValueType,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            value_type,
            required: true,
            default: None,
        }
    }

    pub fn optional(
        key: impl Into<String>,
        description: impl Into<String>,
        value_type: ConfigValueType,
        default: Option<serde_json::Value>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            value_type,
            required: false,
            default,
        }
    }
}

/// 配置校验结果
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// 模块自己的那份运行配置切片
///
/// 引擎按模块 id 切出配置片段后包装成本类型，模块内部再
/// 反序列化成自己的具体配置结构。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleConfig(pub serde_json::Value);

impl ModuleConfig {
    pub fn empty() -> Self {
        Self(serde_json::Value::Null)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// 反序列化成模块自己的类型化配置
    pub fn parse<T: DeserializeOwned>(&self) -> MonitorResult<T> {
        serde_json::from_value(self.0.clone())
            .map_err(|e| MonitorError::Serialization(e.to_string()))
    }

    /// 按模块声明的配置需求做通用校验
    ///
    /// 检查必填键是否存在、取值类型是否匹配。模块自己的
    /// `validate_config` 在此之后运行，负责语义层校验。
    pub fn check_requirements(&self, requirements: &[ConfigRequirement]) -> Vec<String> {
        let mut errors = Vec::new();
        for req in requirements {
            match self.get(&req.key) {
                Some(value) => {
                    if !req.value_type.matches(value) {
                        errors.push(format!(
                            "配置项 {} 类型不匹配，期望 {:?}",
                            req.key, req.value_type
                        ));
                    }
                }
                None => {
                    if req.required && req.default.is_none() {
                        errors.push(format!("缺少必填配置项: {}", req.key));
                    }
                }
            }
        }
        errors
    }
}

/// 检查执行上下文
///
/// 包含一次模块执行所需的全部输入：运行标识、目标身份、
/// 不透明传输句柄以及该模块自己的配置切片。
#[derive(Clone)]
pub struct CheckContext {
    pub run_id: Uuid,
    pub target: MonitorTarget,
    pub transport: Arc<dyn Transport>,
    pub config: ModuleConfig,
}

/// 检查模块核心接口
///
/// 所有可插拔检查都必须实现此trait。实现要求：
///
/// - `can_monitor` 必须幂等且无副作用，返回 false 时引擎记录
///   SKIPPED 结果且不会调用 `run`
/// - `validate_config` 必须是纯函数（不做 I/O），在任何模块执行前
///   对每个待执行模块各调用一次
/// - `run` 中发现的普通问题通过 [`ModuleOutcome`] 返回；返回 `Err`
///   仅用于基础设施失败（网络不可达等），引擎会把它转换成一条
///   合成的 CRITICAL 发现并继续执行后续模块
/// - `cleanup` 在 `run` 完成或失败后尽力调用，自身失败只记日志
#[async_trait]
pub trait CheckModule: Send + Sync {
    /// 稳定且唯一的模块标识
    fn id(&self) -> &str;

    /// 人类可读名称
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn version(&self) -> &str {
        "1.0.0"
    }

    /// 分类，如 "access-control"、"introspection"
    fn category(&self) -> &str;

    /// 声明的执行顺序依赖
    fn dependencies(&self) -> Vec<ModuleDependency> {
        Vec::new()
    }

    /// 声明的配置需求
    fn required_config(&self) -> Vec<ConfigRequirement> {
        Vec::new()
    }

    /// 语义层配置校验，必须是纯函数
    fn validate_config(&self, _config: &ModuleConfig) -> ValidationResult {
        ValidationResult::valid()
    }

    /// 廉价的适用性探测
    async fn can_monitor(
        &self,
        target: &MonitorTarget,
        transport: &Arc<dyn Transport>,
    ) -> MonitorResult<bool>;

    /// 执行检查，可以做任意 I/O
    async fn run(&self, context: &CheckContext) -> MonitorResult<ModuleOutcome>;

    /// 清理资源（可选实现）
    async fn cleanup(&self, _context: &CheckContext) -> MonitorResult<()> {
        Ok(())
    }
}
