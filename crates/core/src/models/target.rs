use serde::{Deserialize, Serialize};

/// 网络上下文
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkContext {
    pub name: String,
    pub chain_id: u64,
}

impl NetworkContext {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            chain_id,
        }
    }

    /// 连接缓存使用的键，名称加链ID保证唯一
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.name, self.chain_id)
    }
}

/// 被监控的目标身份
///
/// 对编排核心不透明，只透传给检查模块并出现在报告里。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorTarget {
    /// 部署名称，如 "my-diamond"
    pub name: String,
    /// 链上地址
    pub address: String,
    pub network: NetworkContext,
}

impl MonitorTarget {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        network: NetworkContext,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            network,
        }
    }
}
