use crate::core::stage::{Stage, StageContext, StageOutcome};
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Guards the whole pipeline: the environment root must already exist (it is
/// created by a separate bootstrap step) and hold a usable interpreter.
/// Failing here means no installation step was ever attempted.
pub struct EnvCheckStage {
    venv_root: PathBuf,
}

impl EnvCheckStage {
    pub fn new(venv_root: PathBuf) -> Self {
        Self { venv_root }
    }
}

#[async_trait]
impl Stage for EnvCheckStage {
    async fn run(&self, _context: &StageContext) -> Result<StageOutcome> {
        if !self.venv_root.is_dir() {
            return Err(ProvisionError::MissingEnvironment {
                path: self.venv_root.display().to_string(),
            });
        }

        let python = self.venv_root.join("bin").join("python");
        if !python.is_file() {
            return Err(ProvisionError::MissingEnvironment {
                path: python.display().to_string(),
            });
        }

        tracing::info!("🐍 Environment root ready: {}", self.venv_root.display());

        Ok(StageOutcome::default().with_metadata(
            "venv_root",
            serde_json::Value::String(self.venv_root.display().to_string()),
        ))
    }

    fn get_name(&self) -> &str {
        "environment-check"
    }
}
