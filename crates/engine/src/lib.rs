//! 监控编排引擎
//!
//! 围绕可插拔检查模块的纯进程内编排库：注册模块、解析执行顺序
//! 依赖、按顺序或有界并发执行、套用每模块的重试与超时策略、把
//! 各模块结果聚合成一份 [`RunReport`](monitor_core::RunReport)，并向
//! 观察者广播生命周期事件。

pub mod aggregator;
pub mod cache;
pub mod engine;
pub mod events;
pub mod registry;
pub mod resolver;
pub mod retry;
pub mod scheduler;

pub use aggregator::RunAggregator;
pub use cache::ConnectionCache;
pub use engine::MonitoringEngine;
pub use events::{EventBus, EventListener, FnListener, ListenerId, MonitorEvent};
pub use registry::ModuleRegistry;
pub use resolver::DependencyResolver;
pub use retry::{retry_with_backoff, with_timeout};
pub use scheduler::{ExecutionScheduler, ScheduledModule};
