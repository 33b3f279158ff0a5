use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use monitor_core::{MonitorError, MonitorResult, RetryPolicy};

/// 带指数退避的通用重试包装
///
/// 最多尝试 `policy.max_attempts` 次；非最后一次失败后按
/// [`RetryPolicy::delay_for_attempt`] 休眠再试，最后一次失败
/// 原样传播错误。
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> MonitorResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = MonitorResult<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    "{} 第 {}/{} 次尝试失败: {}，{}ms 后重试",
                    operation_name,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!(
                    "{} 在 {} 次尝试后仍然失败: {}",
                    operation_name, policy.max_attempts, e
                );
                return Err(e);
            }
        }
    }
}

/// 给模块执行套上硬超时
///
/// 超时表现为一个带模块名和期限的失败；它只是放弃等待，
/// 并不会强行终止模块自己已经发起的 I/O。
pub async fn with_timeout<T>(
    module_id: &str,
    timeout: Duration,
    future: impl Future<Output = MonitorResult<T>>,
) -> MonitorResult<T> {
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(MonitorError::ExecutionTimeout {
            module_id: module_id.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
