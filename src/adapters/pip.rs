use crate::adapters::process::run_streaming;
use crate::domain::model::{InstallSource, PackageSpec};
use crate::domain::ports::Installer;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Installs packages with the environment's own pip. The environment root is
/// held explicitly; no activation or PATH mutation is involved.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    venv_root: PathBuf,
    source_root: PathBuf,
}

impl PipInstaller {
    pub fn new(venv_root: PathBuf, source_root: PathBuf) -> Self {
        Self {
            venv_root,
            source_root,
        }
    }

    fn pip_path(&self) -> PathBuf {
        self.venv_root.join("bin").join("pip")
    }
}

#[async_trait]
impl Installer for PipInstaller {
    async fn install_manifest(&self, manifest: &Path) -> Result<()> {
        tracing::info!("📦 Installing requirements from {}", manifest.display());

        let mut cmd = Command::new(self.pip_path());
        cmd.arg("install").arg("-r").arg(manifest);

        run_streaming(cmd, &format!("pip install -r {}", manifest.display()))
            .await
            .map_err(|e| ProvisionError::InstallError {
                package: "requirements".to_string(),
                details: e.to_string(),
            })
    }

    async fn install(&self, package: &PackageSpec, force: bool) -> Result<()> {
        let mut cmd = Command::new(self.pip_path());
        cmd.arg("install");

        if force {
            tracing::warn!("🔁 Forced reinstall of package: {}", package.name);
            cmd.arg("--force-reinstall").arg("--no-deps");
        } else {
            tracing::info!("📦 Installing package: {}", package.name);
        }

        match &package.source {
            InstallSource::SourceTree { subdir } => {
                cmd.arg(self.source_root.join(subdir));
            }
            InstallSource::Index { requirement } => {
                cmd.arg(requirement);
            }
        }

        run_streaming(cmd, &format!("pip install {}", package.name))
            .await
            .map_err(|e| ProvisionError::InstallError {
                package: package.name.clone(),
                details: e.to_string(),
            })
    }
}
