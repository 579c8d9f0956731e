use crate::core::plan::ProvisionPlan;
use crate::core::stage::{Stage, StageContext, StageOutcome};
use crate::domain::ports::Installer;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Installs the third-party requirements manifest before any package build;
/// the legacy shims fail to build without them.
pub struct RequirementsStage {
    installer: Arc<dyn Installer>,
    source_root: PathBuf,
    manifest: String,
}

impl RequirementsStage {
    pub fn new(installer: Arc<dyn Installer>, source_root: PathBuf, manifest: String) -> Self {
        Self {
            installer,
            source_root,
            manifest,
        }
    }
}

#[async_trait]
impl Stage for RequirementsStage {
    async fn run(&self, _context: &StageContext) -> Result<StageOutcome> {
        let manifest_path = self.source_root.join(&self.manifest);
        self.installer.install_manifest(&manifest_path).await?;

        Ok(StageOutcome::default().with_metadata(
            "requirements_manifest",
            serde_json::Value::String(manifest_path.display().to_string()),
        ))
    }

    fn get_name(&self) -> &str {
        "requirements-install"
    }
}

/// Installs the plan's packages in computed dependency order, fail-fast: the
/// first failing package aborts before any later install command is issued.
pub struct InstallStage {
    installer: Arc<dyn Installer>,
    plan: ProvisionPlan,
    venv_root: PathBuf,
}

impl InstallStage {
    pub fn new(installer: Arc<dyn Installer>, plan: ProvisionPlan, venv_root: PathBuf) -> Self {
        Self {
            installer,
            plan,
            venv_root,
        }
    }

    fn executable_path(&self, name: &str) -> PathBuf {
        self.venv_root.join("bin").join(name)
    }

    /// Fresh filesystem lookup each call; installation may have just added
    /// the script, so no result is cached.
    fn executable_present(&self, name: &str) -> bool {
        self.executable_path(name).is_file()
    }

    /// Health check with a single-retry policy: if the console script is
    /// missing after install, force one reinstall, then give up permanently.
    async fn ensure_executable(
        &self,
        package: &crate::domain::model::PackageSpec,
        executable: &str,
    ) -> Result<()> {
        if self.executable_present(executable) {
            tracing::info!("🩺 Health check passed: {} present", executable);
            return Ok(());
        }

        tracing::warn!(
            "🩺 '{}' missing after installing {}, forcing one reinstall",
            executable,
            package.name
        );
        self.installer.install(package, true).await?;

        if self.executable_present(executable) {
            tracing::info!("🩺 Health check passed after forced reinstall");
            Ok(())
        } else {
            Err(ProvisionError::ExecutableMissing {
                name: executable.to_string(),
                path: self.venv_root.join("bin").display().to_string(),
            })
        }
    }
}

#[async_trait]
impl Stage for InstallStage {
    async fn run(&self, _context: &StageContext) -> Result<StageOutcome> {
        let order = self.plan.install_order()?;
        tracing::info!(
            "📋 Resolved install order: {}",
            order
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        for package in &order {
            self.installer.install(package, false).await?;

            if let Some(executable) = &package.health_check_executable {
                self.ensure_executable(package, executable).await?;
            }
        }

        let installed: Vec<serde_json::Value> = order
            .iter()
            .map(|p| serde_json::Value::String(p.name.clone()))
            .collect();

        Ok(StageOutcome::default()
            .with_metadata(
                "installed_packages",
                serde_json::Value::Number(order.len().into()),
            )
            .with_metadata("install_order", serde_json::Value::Array(installed)))
    }

    fn get_name(&self) -> &str {
        "package-install"
    }
}
