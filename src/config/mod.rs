pub mod plan_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_one_of, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
pub const ACTIONS: [&str; 3] = ["build", "verify", "clean"];

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "bisque-provision")]
#[command(about = "Provision a BisQue application environment")]
pub struct CliConfig {
    /// Action to perform: build (full pipeline), verify or clean
    #[arg(default_value = "build")]
    pub action: String,

    /// Environment root to provision
    #[arg(long, env = "VENV", default_value = "/usr/lib/bisque")]
    pub venv: PathBuf,

    /// Root of the package source tree
    #[arg(long, default_value = "/source")]
    pub source_root: PathBuf,

    /// Requirements manifest, relative to the source root
    #[arg(long, default_value = "requirements.txt")]
    pub requirements: String,

    /// TOML plan overriding the built-in package set
    #[arg(long)]
    pub plan: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory stats")]
    pub monitor: bool,

    /// Show the resolved stage and install order without executing
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn venv_root(&self) -> &Path {
        &self.venv
    }

    fn source_root(&self) -> &Path {
        &self.source_root
    }

    fn requirements_manifest(&self) -> &str {
        &self.requirements
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_one_of("action", &self.action, &ACTIONS)?;
        validate_path("venv", &self.venv.display().to_string())?;
        validate_path("source_root", &self.source_root.display().to_string())?;
        validate_non_empty_string("requirements", &self.requirements)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            action: "build".to_string(),
            venv: PathBuf::from("/usr/lib/bisque"),
            source_root: PathBuf::from("/source"),
            requirements: "requirements.txt".to_string(),
            plan: None,
            verbose: false,
            monitor: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let mut config = base_config();
        config.action = "deploy".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_requirements_rejected() {
        let mut config = base_config();
        config.requirements = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_venv_env_override() {
        let config =
            CliConfig::try_parse_from(["bisque-provision", "--venv", "/opt/bisque"]).unwrap();
        assert_eq!(config.venv, PathBuf::from("/opt/bisque"));
        assert_eq!(config.action, "build");
    }
}
