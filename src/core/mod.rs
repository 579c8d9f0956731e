pub mod engine;
pub mod graph;
pub mod plan;
pub mod sequence;
pub mod stage;

pub use crate::domain::model::{InstallSource, PackageSpec, StageReport};
pub use crate::domain::ports::{ConfigProvider, Installer, ModuleProbe};
pub use crate::utils::error::Result;
