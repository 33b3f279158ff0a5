pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::{ExecutionStrategy, ModuleSettings, MonitoringConfig, RetryPolicy};
pub use errors::{MonitorError, MonitorResult};
pub use models::{
    CheckStatus, Issue, ModuleOutcome, ModuleResult, MonitorTarget, NetworkContext, RunReport,
    RunSummary, Severity,
};
pub use traits::{
    CheckContext, CheckModule, ConfigRequirement, ConfigValueType, ModuleConfig,
    ModuleDependency, Transport, ValidationResult,
};
