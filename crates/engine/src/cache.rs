use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use monitor_core::{NetworkContext, Transport};

/// 网络连接缓存
///
/// 以"网络名:链ID"为键缓存传输句柄的显式对象，由引擎实例持有，
/// 生命周期通过 `clear` 显式管理，避免进程级隐式状态。
pub struct ConnectionCache {
    connections: RwLock<HashMap<String, Arc<dyn Transport>>>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, network: &NetworkContext, transport: Arc<dyn Transport>) {
        debug!("缓存网络 {} 的传输连接", network.cache_key());
        self.connections
            .write()
            .expect("connection cache lock poisoned")
            .insert(network.cache_key(), transport);
    }

    pub fn get(&self, network: &NetworkContext) -> Option<Arc<dyn Transport>> {
        self.connections
            .read()
            .expect("connection cache lock poisoned")
            .get(&network.cache_key())
            .cloned()
    }

    pub fn remove(&self, network: &NetworkContext) -> bool {
        self.connections
            .write()
            .expect("connection cache lock poisoned")
            .remove(&network.cache_key())
            .is_some()
    }

    pub fn clear(&self) {
        let mut connections = self
            .connections
            .write()
            .expect("connection cache lock poisoned");
        debug!("清空连接缓存（{} 个连接）", connections.len());
        connections.clear();
    }

    pub fn len(&self) -> usize {
        self.connections
            .read()
            .expect("connection cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConnectionCache {
    fn default() -> Self {
        Self::new()
    }
}
