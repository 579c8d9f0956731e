pub mod cleanup;
pub mod env_check;
pub mod install;
pub mod verify;

pub use cleanup::CleanupStage;
pub use env_check::EnvCheckStage;
pub use install::{InstallStage, RequirementsStage};
pub use verify::VerifyStage;
