pub mod issue;
pub mod outcome;
pub mod report;
pub mod target;

pub use issue::{Issue, Severity};
pub use outcome::{CheckStatus, ModuleOutcome, ModuleResult};
pub use report::{RunReport, RunSummary};
pub use target::{MonitorTarget, NetworkContext};
