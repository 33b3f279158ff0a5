use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use monitor_core::{CheckModule, MonitorError, MonitorResult};

/// 检查模块注册表
///
/// 按唯一 id 持有模块，插入顺序无关。注册表由单个引擎实例独占，
/// 运行期间的并发修改由调用方负责串行化。
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn CheckModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// 注册模块，id 已存在时报错且不改动注册表
    pub fn register(&mut self, module: Arc<dyn CheckModule>) -> MonitorResult<()> {
        let id = module.id().to_string();
        if self.modules.contains_key(&id) {
            return Err(MonitorError::DuplicateModule { id });
        }
        debug!("注册检查模块: {} ({})", id, module.name());
        self.modules.insert(id, module);
        Ok(())
    }

    pub fn unregister(&mut self, module_id: &str) -> bool {
        let removed = self.modules.remove(module_id).is_some();
        if removed {
            debug!("注销检查模块: {}", module_id);
        }
        removed
    }

    pub fn get(&self, module_id: &str) -> Option<Arc<dyn CheckModule>> {
        self.modules.get(module_id).cloned()
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.modules.contains_key(module_id)
    }

    /// 所有已注册模块的 id 列表
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modules.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn count(&self) -> usize {
        self.modules.len()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
