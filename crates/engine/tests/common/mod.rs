//! Test doubles for engine integration tests
//!
//! Provides a configurable fake check module with builder-style setup
//! and sensible defaults, plus a static transport stub.
#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use monitor_core::{
    CheckContext, CheckModule, ConfigRequirement, Issue, ModuleConfig, ModuleDependency,
    ModuleOutcome, MonitorError, MonitorResult, MonitorTarget, NetworkContext, Severity,
    Transport, ValidationResult,
};

pub fn test_target() -> MonitorTarget {
    MonitorTarget::new(
        "test-diamond",
        "0x1234567890abcdef1234567890abcdef12345678",
        NetworkContext::new("testnet", 31337),
    )
}

/// Stub transport carrying only an endpoint string
pub struct StaticTransport {
    endpoint: String,
}

impl StaticTransport {
    pub fn new(endpoint: &str) -> Arc<dyn Transport> {
        Arc::new(Self {
            endpoint: endpoint.to_string(),
        })
    }
}

impl Transport for StaticTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Tracks how many module executions overlap in time
pub struct ConcurrencyGauge {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl ConcurrencyGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: AtomicUsize::new(0),
            max: AtomicUsize::new(0),
        })
    }

    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max_observed(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

/// Configurable fake check module
///
/// Defaults to an applicable module that runs instantly and passes.
pub struct FakeModule {
    id: String,
    category: String,
    deps: Vec<ModuleDependency>,
    deps_panic: bool,
    applicable: bool,
    probe_fails: bool,
    issues: Vec<Issue>,
    delay: Duration,
    fail_first_runs: u32,
    always_fails: bool,
    hangs: bool,
    panics: bool,
    config_errors: Vec<String>,
    required: Vec<ConfigRequirement>,
    cleanup_fails: bool,
    run_log: Option<Arc<Mutex<Vec<String>>>>,
    gauge: Option<Arc<ConcurrencyGauge>>,
    probe_calls: AtomicU32,
    run_calls: AtomicU32,
    cleanup_calls: AtomicU32,
}

impl FakeModule {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            category: "test".to_string(),
            deps: Vec::new(),
            deps_panic: false,
            applicable: true,
            probe_fails: false,
            issues: Vec::new(),
            delay: Duration::ZERO,
            fail_first_runs: 0,
            always_fails: false,
            hangs: false,
            panics: false,
            config_errors: Vec::new(),
            required: Vec::new(),
            cleanup_fails: false,
            run_log: None,
            gauge: None,
            probe_calls: AtomicU32::new(0),
            run_calls: AtomicU32::new(0),
            cleanup_calls: AtomicU32::new(0),
        }
    }

    pub fn with_dependency(mut self, module_id: &str) -> Self {
        self.deps.push(ModuleDependency::required(module_id));
        self
    }

    pub fn with_panicking_dependencies(mut self) -> Self {
        self.deps_panic = true;
        self
    }

    pub fn not_applicable(mut self) -> Self {
        self.applicable = false;
        self
    }

    pub fn probe_failing(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    pub fn with_issue(mut self, severity: Severity) -> Self {
        let n = self.issues.len();
        self.issues.push(Issue::new(
            format!("{}-issue-{n}", self.id),
            format!("issue {n} from {}", self.id),
            severity,
            "test",
        ));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.always_fails = true;
        self
    }

    pub fn failing_first(mut self, attempts: u32) -> Self {
        self.fail_first_runs = attempts;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hangs = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn with_config_error(mut self, error: &str) -> Self {
        self.config_errors.push(error.to_string());
        self
    }

    pub fn with_required_config(mut self, requirement: ConfigRequirement) -> Self {
        self.required.push(requirement);
        self
    }

    pub fn with_failing_cleanup(mut self) -> Self {
        self.cleanup_fails = true;
        self
    }

    pub fn with_run_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.run_log = Some(log);
        self
    }

    pub fn with_gauge(mut self, gauge: Arc<ConcurrencyGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn build(self) -> Arc<FakeModule> {
        Arc::new(self)
    }

    pub fn probe_calls(&self) -> u32 {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn run_calls(&self) -> u32 {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn cleanup_calls(&self) -> u32 {
        self.cleanup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckModule for FakeModule {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "fake module for tests"
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn dependencies(&self) -> Vec<ModuleDependency> {
        if self.deps_panic {
            panic!("dependencies() exploded");
        }
        self.deps.clone()
    }

    fn required_config(&self) -> Vec<ConfigRequirement> {
        self.required.clone()
    }

    fn validate_config(&self, _config: &ModuleConfig) -> ValidationResult {
        let mut result = ValidationResult::valid();
        for error in &self.config_errors {
            result = result.with_error(error.clone());
        }
        result
    }

    async fn can_monitor(
        &self,
        _target: &MonitorTarget,
        _transport: &Arc<dyn Transport>,
    ) -> MonitorResult<bool> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_fails {
            return Err(MonitorError::ExecutionFailed(format!(
                "{}: probe cannot reach node",
                self.id
            )));
        }
        Ok(self.applicable)
    }

    async fn run(&self, _context: &CheckContext) -> MonitorResult<ModuleOutcome> {
        let call = self.run_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(log) = &self.run_log {
            log.lock().unwrap().push(self.id.clone());
        }

        if self.hangs {
            std::future::pending::<()>().await;
        }
        if self.panics {
            panic!("{} blew up", self.id);
        }

        if let Some(gauge) = &self.gauge {
            gauge.enter();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(gauge) = &self.gauge {
            gauge.exit();
        }

        if self.always_fails || call <= self.fail_first_runs {
            return Err(MonitorError::ExecutionFailed(format!(
                "{}: rpc unreachable (attempt {call})",
                self.id
            )));
        }

        Ok(ModuleOutcome::from_issues(
            self.issues.clone(),
            self.delay.as_millis() as u64,
        ))
    }

    async fn cleanup(&self, _context: &CheckContext) -> MonitorResult<()> {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        if self.cleanup_fails {
            return Err(MonitorError::Internal(format!(
                "{}: cleanup failed",
                self.id
            )));
        }
        Ok(())
    }
}
