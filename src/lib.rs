pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod stages;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::{PipInstaller, PythonProbe};
pub use crate::config::plan_config::PlanConfig;
pub use crate::core::engine::ProvisionEngine;
pub use crate::core::plan::ProvisionPlan;
pub use crate::core::sequence::StageSequence;
pub use crate::utils::error::{ProvisionError, Result};
