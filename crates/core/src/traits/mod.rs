pub mod check_module;
pub mod transport;

pub use check_module::{
    CheckContext, CheckModule, ConfigRequirement, ConfigValueType, ModuleConfig,
    ModuleDependency, ValidationResult,
};
pub use transport::Transport;
