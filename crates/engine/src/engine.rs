use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use monitor_core::{
    CheckContext, CheckModule, MonitoringConfig, MonitorError, MonitorResult, MonitorTarget,
    RunReport, Transport,
};

use crate::aggregator::RunAggregator;
use crate::cache::ConnectionCache;
use crate::events::{EventBus, EventListener, ListenerId, MonitorEvent};
use crate::registry::ModuleRegistry;
use crate::resolver::DependencyResolver;
use crate::scheduler::{ExecutionScheduler, ScheduledModule};

/// 监控编排引擎
///
/// 持有模块注册表、事件总线和连接缓存的门面。一次
/// [`run_monitoring`](MonitoringEngine::run_monitoring) 调用要么返回
/// 结构完整的 [`RunReport`]（失败信息在报告里），要么只在执行前的
/// 配置校验失败时返回错误。
///
/// 注册表与监听器列表由单个引擎实例独占；运行进行中并发调用
/// `register_module`/`unregister_module` 不安全，由调用方串行化。
pub struct MonitoringEngine {
    registry: ModuleRegistry,
    events: Arc<EventBus>,
    connections: ConnectionCache,
    config: MonitoringConfig,
}

impl MonitoringEngine {
    pub fn new(config: MonitoringConfig) -> Self {
        Self {
            registry: ModuleRegistry::new(),
            events: Arc::new(EventBus::new()),
            connections: ConnectionCache::new(),
            config,
        }
    }

    // ---- 模块注册 API ----

    /// 注册模块，id 已存在时报错
    pub fn register_module(&mut self, module: Arc<dyn CheckModule>) -> MonitorResult<()> {
        self.registry.register(module)
    }

    pub fn unregister_module(&mut self, module_id: &str) -> bool {
        self.registry.unregister(module_id)
    }

    pub fn get_module(&self, module_id: &str) -> Option<Arc<dyn CheckModule>> {
        self.registry.get(module_id)
    }

    pub fn list_modules(&self) -> Vec<String> {
        self.registry.list()
    }

    // ---- 事件订阅 API ----

    pub fn add_listener(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        self.events.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.events.remove_listener(id)
    }

    // ---- 连接缓存 ----

    pub fn connection_cache(&self) -> &ConnectionCache {
        &self.connections
    }

    // ---- 运行调用 API ----

    /// 执行一次监控运行
    ///
    /// `transport` 原样透传给每个模块，引擎从不检查其内部。
    /// `module_filter` 为 `Some` 时只运行列出的模块（还要经过
    /// 配置里的 enabled 过滤）；列出未注册的模块 id 直接报错。
    pub async fn run_monitoring(
        &self,
        target: MonitorTarget,
        transport: Arc<dyn Transport>,
        config: &MonitoringConfig,
        module_filter: Option<&[&str]>,
    ) -> MonitorResult<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        config
            .validate()
            .map_err(|e| MonitorError::Configuration(e.to_string()))?;

        if let Some(filter) = module_filter {
            for id in filter {
                if self.registry.get(id).is_none() {
                    return Err(MonitorError::ModuleNotFound { id: id.to_string() });
                }
            }
        }

        let selected = self.select_modules(config, module_filter);
        info!(
            "启动监控运行 {}：目标 {}，共 {} 个模块",
            run_id,
            target.name,
            selected.len()
        );

        // 失败闭合：任何模块的配置不合法都会在执行前中止整个运行
        self.validate_module_configs(&selected, config)?;

        self.events.emit(&MonitorEvent::RunStarted {
            run_id,
            target_name: target.name.clone(),
            module_count: selected.len(),
        });

        // 运行级失败边界：解析会调用模块自报的 dependencies()，属于
        // 外来代码；它在任何模块执行前出错时仍要交出一份完整报告
        let resolved = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            DependencyResolver::resolve(&selected)
        }));
        let ordered = match resolved {
            Ok(ordered) => ordered,
            Err(panic) => {
                let message = crate::scheduler::panic_message(panic);
                error!("监控运行 {} 在执行前失败: {}", run_id, message);
                let report = RunAggregator::failure_report(
                    run_id,
                    target,
                    config.snapshot(),
                    started_at,
                    &message,
                );
                self.events.emit(&MonitorEvent::RunCompleted {
                    run_id,
                    overall_status: report.summary.overall_status,
                    duration_ms: report.duration_ms,
                });
                return Ok(report);
            }
        };

        let scheduled: Vec<ScheduledModule> = ordered
            .into_iter()
            .map(|module| {
                let context = CheckContext {
                    run_id,
                    target: target.clone(),
                    transport: Arc::clone(&transport),
                    config: config.module_config(module.id()),
                };
                ScheduledModule { module, context }
            })
            .collect();

        let scheduler = ExecutionScheduler::new(
            config.retry.clone(),
            config.module_timeout(),
            Arc::clone(&self.events),
        );
        let results = scheduler.execute(&config.strategy, scheduled).await;

        let report = RunAggregator::build_report(
            run_id,
            target,
            results,
            config.snapshot(),
            started_at,
        );

        self.events.emit(&MonitorEvent::RunCompleted {
            run_id,
            overall_status: report.summary.overall_status,
            duration_ms: report.duration_ms,
        });
        info!(
            "监控运行 {} 结束：{}（{} 通过 / {} 失败 / {} 警告 / {} 跳过）",
            run_id,
            report.summary.overall_status,
            report.summary.passed,
            report.summary.failed,
            report.summary.warnings,
            report.summary.skipped
        );

        Ok(report)
    }

    /// 用连接缓存里的传输句柄执行监控
    pub async fn run_with_cached_transport(
        &self,
        target: MonitorTarget,
        config: &MonitoringConfig,
        module_filter: Option<&[&str]>,
    ) -> MonitorResult<RunReport> {
        let transport = self.connections.get(&target.network).ok_or_else(|| {
            MonitorError::TransportNotCached {
                network: target.network.cache_key(),
            }
        })?;
        self.run_monitoring(target, transport, config, module_filter).await
    }

    /// 用引擎自带的默认配置执行监控
    pub async fn run_with_default_config(
        &self,
        target: MonitorTarget,
        transport: Arc<dyn Transport>,
        module_filter: Option<&[&str]>,
    ) -> MonitorResult<RunReport> {
        let config = self.config.clone();
        self.run_monitoring(target, transport, &config, module_filter).await
    }

    /// 选出本次运行的模块子集
    ///
    /// 过滤顺序：filter 交集 -> enabled 过滤 -> 按优先级降序排序
    /// （同优先级按 id 字典序，保证确定性）。排序结果就是解析器
    /// 打破平局时使用的"原始顺序"。
    fn select_modules(
        &self,
        config: &MonitoringConfig,
        module_filter: Option<&[&str]>,
    ) -> Vec<Arc<dyn CheckModule>> {
        let mut selected: Vec<Arc<dyn CheckModule>> = self
            .registry
            .list()
            .iter()
            .filter(|id| match module_filter {
                Some(filter) => filter.contains(&id.as_str()),
                None => true,
            })
            .filter(|id| {
                let enabled = config.is_module_enabled(id);
                if !enabled {
                    debug!("模块 {} 已在配置中禁用，跳过", id);
                }
                enabled
            })
            .filter_map(|id| self.registry.get(id))
            .collect();

        selected.sort_by(|a, b| {
            config
                .module_priority(b.id())
                .cmp(&config.module_priority(a.id()))
                .then_with(|| a.id().cmp(b.id()))
        });

        selected
    }

    /// 执行前的失败闭合配置校验
    ///
    /// 先按模块声明的配置需求做通用校验，再调用模块自己的
    /// `validate_config`。任何错误都会中止整个运行——迟发现的
    /// 配置问题不应产出一份残缺且有误导性的报告。
    fn validate_module_configs(
        &self,
        selected: &[Arc<dyn CheckModule>],
        config: &MonitoringConfig,
    ) -> MonitorResult<()> {
        for module in selected {
            let module_config = config.module_config(module.id());

            let mut errors = module_config.check_requirements(&module.required_config());

            let validation = module.validate_config(&module_config);
            for warning in &validation.warnings {
                debug!("模块 {} 配置警告: {}", module.id(), warning);
            }
            errors.extend(validation.errors);

            if !errors.is_empty() {
                error!("模块 {} 配置校验失败: {:?}", module.id(), errors);
                return Err(MonitorError::InvalidModuleConfig {
                    module_id: module.id().to_string(),
                    errors,
                });
            }
        }
        Ok(())
    }
}
