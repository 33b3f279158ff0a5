use thiserror::Error;

/// 监控引擎错误类型定义
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("检查模块已存在: {id}")]
    DuplicateModule { id: String },

    #[error("检查模块未找到: {id}")]
    ModuleNotFound { id: String },

    #[error("模块 {module_id} 配置校验失败: {errors:?}")]
    InvalidModuleConfig {
        module_id: String,
        errors: Vec<String>,
    },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("模块 {module_id} 执行超时 ({timeout_ms}ms)")]
    ExecutionTimeout { module_id: String, timeout_ms: u64 },

    #[error("模块执行错误: {0}")]
    ExecutionFailed(String),

    #[error("网络 {network} 没有缓存的传输连接")]
    TransportNotCached { network: String },

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;
