use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::traits::ModuleConfig;

/// 重试策略
///
/// 第 n 次尝试失败后的等待时间为
/// `min(base_delay · backoff_multiplier^(n-1), max_delay)`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 基础重试间隔（毫秒）
    pub base_delay_ms: u64,
    /// 最大重试间隔（毫秒）
    pub max_delay_ms: u64,
    /// 指数退避倍数
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,  // 1秒
            max_delay_ms: 10_000,  // 10秒上限
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次尝试失败后的退避时长，attempt 从 1 计数
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponential =
            self.base_delay_ms as f64 * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = exponential.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

/// 执行策略
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// 按依赖顺序逐个执行，可选首次失败即停止调度
    Sequential {
        #[serde(default)]
        fail_fast: bool,
    },
    /// 有界并发执行，依赖顺序只作为准入顺序
    Concurrent { max_concurrency: usize },
}

impl Default for ExecutionStrategy {
    fn default() -> Self {
        ExecutionStrategy::Sequential { fail_fast: false }
    }
}

/// 单个模块的运行设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 优先级，数值越大越先被调度
    #[serde(default)]
    pub priority: i32,
    /// 模块自己的配置切片
    #[serde(default)]
    pub config: serde_json::Value,
}

fn default_enabled() -> bool {
    true
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: 0,
            config: serde_json::Value::Null,
        }
    }
}

/// 监控运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub strategy: ExecutionStrategy,
    /// 单个模块的执行超时（毫秒）
    #[serde(default = "default_module_timeout_ms")]
    pub module_timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// 按模块 id 划分的模块设置
    #[serde(default)]
    pub modules: HashMap<String, ModuleSettings>,
}

fn default_module_timeout_ms() -> u64 {
    30_000
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::default(),
            module_timeout_ms: default_module_timeout_ms(),
            retry: RetryPolicy::default(),
            modules: HashMap::new(),
        }
    }
}

impl MonitoringConfig {
    /// 从 TOML 文件加载配置
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let ExecutionStrategy::Concurrent { max_concurrency } = self.strategy {
            if max_concurrency == 0 {
                return Err(anyhow::anyhow!("最大并发数必须大于0"));
            }
        }

        if self.module_timeout_ms == 0 {
            return Err(anyhow::anyhow!("模块超时时间必须大于0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(anyhow::anyhow!("最大尝试次数必须大于0"));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(anyhow::anyhow!(
                "退避倍数不能小于1.0: {}",
                self.retry.backoff_multiplier
            ));
        }

        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(anyhow::anyhow!("基础重试间隔不能大于最大重试间隔"));
        }

        Ok(())
    }

    pub fn module_timeout(&self) -> Duration {
        Duration::from_millis(self.module_timeout_ms)
    }

    /// 模块是否启用，未配置的模块默认启用
    pub fn is_module_enabled(&self, module_id: &str) -> bool {
        self.modules.get(module_id).map_or(true, |s| s.enabled)
    }

    /// 模块优先级，未配置的模块为0
    pub fn module_priority(&self, module_id: &str) -> i32 {
        self.modules.get(module_id).map_or(0, |s| s.priority)
    }

    /// 切出某个模块自己的配置片段
    pub fn module_config(&self, module_id: &str) -> ModuleConfig {
        self.modules
            .get(module_id)
            .map(|s| ModuleConfig(s.config.clone()))
            .unwrap_or_else(ModuleConfig::empty)
    }

    /// 嵌入报告的配置快照
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
