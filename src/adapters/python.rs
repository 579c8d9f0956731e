use crate::adapters::process::run_streaming;
use crate::domain::ports::ModuleProbe;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Imports modules with the environment's interpreter, one throwaway process
/// per module, so a crashing import cannot poison later probes.
#[derive(Debug, Clone)]
pub struct PythonProbe {
    venv_root: PathBuf,
}

impl PythonProbe {
    pub fn new(venv_root: PathBuf) -> Self {
        Self { venv_root }
    }

    fn python_path(&self) -> PathBuf {
        self.venv_root.join("bin").join("python")
    }
}

#[async_trait]
impl ModuleProbe for PythonProbe {
    async fn import_module(&self, module: &str) -> Result<()> {
        let mut cmd = Command::new(self.python_path());
        cmd.arg("-c").arg(format!("import {}", module));

        run_streaming(cmd, &format!("python -c 'import {}'", module))
            .await
            .map_err(|_| ProvisionError::ImportFailed {
                module: module.to_string(),
            })
    }
}
