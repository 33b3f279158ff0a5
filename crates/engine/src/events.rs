use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use monitor_core::{CheckStatus, Issue};

/// 监控生命周期事件
///
/// 除"同一模块的 start 先于它自己的 complete/error"之外，
/// 并发执行的模块之间没有跨模块顺序保证。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorEvent {
    RunStarted {
        run_id: Uuid,
        target_name: String,
        module_count: usize,
    },
    RunCompleted {
        run_id: Uuid,
        overall_status: CheckStatus,
        duration_ms: u64,
    },
    ModuleStarted {
        module_id: String,
    },
    ModuleCompleted {
        module_id: String,
        status: CheckStatus,
        duration_ms: u64,
    },
    ModuleError {
        module_id: String,
        error: String,
    },
    IssueFound {
        module_id: String,
        issue: Issue,
    },
}

/// 事件监听器
///
/// 返回 `Err` 只会被记录，既不会阻断后续监听器，也不会影响运行。
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &MonitorEvent) -> anyhow::Result<()>;
}

/// 闭包监听器适配
pub struct FnListener<F>(pub F);

impl<F> EventListener for FnListener<F>
where
    F: Fn(&MonitorEvent) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &MonitorEvent) -> anyhow::Result<()> {
        (self.0)(event)
    }
}

/// 监听器句柄，用于注销
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// 事件总线
///
/// 简单的进程内多播：`emit` 按注册顺序同步调用每个监听器，
/// 单个监听器的失败被隔离。不做缓冲，不做重放。
pub struct EventBus {
    listeners: RwLock<Vec<(ListenerId, Arc<dyn EventListener>)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .expect("event listener lock poisoned")
            .push((id, listener));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .expect("event listener lock poisoned");
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() < before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .expect("event listener lock poisoned")
            .len()
    }

    /// 同步广播事件，按注册顺序逐个调用
    pub fn emit(&self, event: &MonitorEvent) {
        let listeners = self
            .listeners
            .read()
            .expect("event listener lock poisoned")
            .clone();
        for (id, listener) in listeners {
            if let Err(e) = listener.on_event(event) {
                warn!("事件监听器 {:?} 处理 {:?} 失败: {}", id, event, e);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
