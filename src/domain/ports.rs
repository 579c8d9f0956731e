use crate::domain::model::PackageSpec;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait ConfigProvider: Send + Sync {
    fn venv_root(&self) -> &Path;
    fn source_root(&self) -> &Path;
    fn requirements_manifest(&self) -> &str;
}

#[async_trait]
pub trait Installer: Send + Sync {
    /// Install every requirement listed in a manifest file.
    async fn install_manifest(&self, manifest: &Path) -> Result<()>;

    /// Install one package. `force` reinstalls over an existing copy
    /// without touching its dependencies.
    async fn install(&self, package: &PackageSpec, force: bool) -> Result<()>;
}

#[async_trait]
pub trait ModuleProbe: Send + Sync {
    /// Import `module` in a throwaway interpreter process.
    async fn import_module(&self, module: &str) -> Result<()>;
}
