use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use monitor_core::{
    CheckContext, CheckModule, CheckStatus, ExecutionStrategy, ModuleOutcome, ModuleResult,
    RetryPolicy,
};

use crate::aggregator::synthetic_failure_outcome;
use crate::events::{EventBus, MonitorEvent};
use crate::retry::{retry_with_backoff, with_timeout};

/// 一个待执行的模块及其上下文
pub struct ScheduledModule {
    pub module: Arc<dyn CheckModule>,
    pub context: CheckContext,
}

/// 执行调度器
///
/// 每个模块独立经历 `PENDING -> (SKIPPED | RUNNING -> PASS/WARNING/FAIL)`。
/// 所有执行路径都经过重试/超时包装，任何未捕获的失败都会变成一条
/// 合成 CRITICAL 发现加 FAIL 结果，绝不抛出引擎级异常。
///
/// 并发策略只保证依赖顺序作为*准入*顺序：后续模块可能在前序模块
/// 完成前就开始执行。需要严格先后完成关系的调用方应使用顺序策略。
#[derive(Clone)]
pub struct ExecutionScheduler {
    retry_policy: RetryPolicy,
    module_timeout: Duration,
    events: Arc<EventBus>,
}

impl ExecutionScheduler {
    pub fn new(retry_policy: RetryPolicy, module_timeout: Duration, events: Arc<EventBus>) -> Self {
        Self {
            retry_policy,
            module_timeout,
            events,
        }
    }

    /// 按配置的策略执行整组模块，返回按开始时间排序的结果
    pub async fn execute(
        &self,
        strategy: &ExecutionStrategy,
        scheduled: Vec<ScheduledModule>,
    ) -> Vec<ModuleResult> {
        let mut results = match strategy {
            ExecutionStrategy::Sequential { fail_fast } => {
                self.execute_sequential(scheduled, *fail_fast).await
            }
            ExecutionStrategy::Concurrent { max_concurrency } => {
                self.execute_concurrent(scheduled, *max_concurrency).await
            }
        };

        // 完成顺序随 I/O 延迟交错，按开始时间排序保证报告确定性
        results.sort_by_key(|r| r.started_at);
        results
    }

    async fn execute_sequential(
        &self,
        scheduled: Vec<ScheduledModule>,
        fail_fast: bool,
    ) -> Vec<ModuleResult> {
        let mut results = Vec::with_capacity(scheduled.len());

        for entry in scheduled {
            let result = self.execute_module(entry).await;
            let failed = result.status() == CheckStatus::Fail;
            results.push(result);

            if fail_fast && failed {
                info!("fail-fast enabled, stopping after first failed module");
                break;
            }
        }

        results
    }

    async fn execute_concurrent(
        &self,
        scheduled: Vec<ScheduledModule>,
        max_concurrency: usize,
    ) -> Vec<ModuleResult> {
        let semaphore = Arc::new(Semaphore::new(max_concurrency));
        let mut join_set: JoinSet<ModuleResult> = JoinSet::new();

        for entry in scheduled {
            // 在派发前等待空闲槽位，依赖顺序因此成为准入顺序
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore closed, nothing more to admit
            };
            let scheduler = self.clone();
            join_set.spawn(async move {
                let result = scheduler.execute_module(entry).await;
                drop(permit);
                result
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    // execute_module 内部已经捕获了模块恐慌，走到这里
                    // 只能是任务被取消之类的运行时异常
                    warn!("module execution task failed to join: {}", e);
                }
            }
        }

        results
    }

    /// 执行单个模块的完整流水线：探测 -> 执行 -> 清理 -> 状态推导
    async fn execute_module(&self, entry: ScheduledModule) -> ModuleResult {
        let ScheduledModule { module, context } = entry;
        let module_id = module.id().to_string();
        let module_name = module.name().to_string();
        let started_at = Utc::now();

        self.events.emit(&MonitorEvent::ModuleStarted {
            module_id: module_id.clone(),
        });

        let probe = {
            let module = Arc::clone(&module);
            let context = context.clone();
            retry_with_backoff(
                &self.retry_policy,
                &format!("module {module_id} applicability probe"),
                move || {
                    let module = Arc::clone(&module);
                    let context = context.clone();
                    async move { module.can_monitor(&context.target, &context.transport).await }
                },
            )
            .await
        };

        let (outcome, error) = match probe {
            Ok(false) => {
                debug!("module {} is not applicable to target, skipping", module_id);
                (ModuleOutcome::skipped(), None)
            }
            Ok(true) => self.run_module(&module, &context, &module_id).await,
            Err(e) => {
                // 探测在重试耗尽后仍失败，按模块级失败处理
                let message = e.to_string();
                (synthetic_failure_outcome(&module_id, &message), Some(message))
            }
        };

        let result = ModuleResult::new(&module_id, &module_name, started_at, outcome, error);
        self.emit_module_finished(&result);
        result
    }

    async fn run_module(
        &self,
        module: &Arc<dyn CheckModule>,
        context: &CheckContext,
        module_id: &str,
    ) -> (ModuleOutcome, Option<String>) {
        let operation_name = format!("module {module_id} run");
        let retried_run = {
            let module = Arc::clone(module);
            let context = context.clone();
            retry_with_backoff(
                &self.retry_policy,
                &operation_name,
                move || {
                    let module = Arc::clone(&module);
                    let context = context.clone();
                    async move { module.run(&context).await }
                },
            )
        };

        // 超时与重试后的执行赛跑；模块恐慌也被隔离成普通失败
        let run_result = AssertUnwindSafe(with_timeout(module_id, self.module_timeout, retried_run))
            .catch_unwind()
            .await;

        // 清理始终尽力执行，失败只记日志
        if let Err(e) = module.cleanup(context).await {
            warn!("module {} cleanup failed: {}", module_id, e);
        }

        match run_result {
            Ok(Ok(mut outcome)) => {
                // 状态统一由发现列表推导，模块自报的状态不作数
                outcome.status = CheckStatus::from_issues(&outcome.issues);
                (outcome, None)
            }
            Ok(Err(e)) => {
                let message = e.to_string();
                (synthetic_failure_outcome(module_id, &message), Some(message))
            }
            Err(panic) => {
                let message = panic_message(panic);
                warn!("module {} panicked: {}", module_id, message);
                (synthetic_failure_outcome(module_id, &message), Some(message))
            }
        }
    }

    /// 模块结束后发布事件：每条发现一个 issue-found，然后是
    /// module-complete 或 module-error
    fn emit_module_finished(&self, result: &ModuleResult) {
        for issue in &result.outcome.issues {
            self.events.emit(&MonitorEvent::IssueFound {
                module_id: result.module_id.clone(),
                issue: issue.clone(),
            });
        }

        match &result.error {
            Some(error) => {
                self.events.emit(&MonitorEvent::ModuleError {
                    module_id: result.module_id.clone(),
                    error: error.clone(),
                });
            }
            None => {
                self.events.emit(&MonitorEvent::ModuleCompleted {
                    module_id: result.module_id.clone(),
                    status: result.status(),
                    duration_ms: result.duration_ms,
                });
            }
        }
    }
}

pub(crate) fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "module panicked".to_string()
    }
}
